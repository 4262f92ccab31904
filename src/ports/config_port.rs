//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// All `key = value` pairs of a section, or `None` if the section is absent.
    fn get_section(&self, section: &str) -> Option<Vec<(String, String)>>;
}
