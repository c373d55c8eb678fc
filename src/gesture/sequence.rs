//! Ordered list of clip file names chosen by the model for one phrase.

/// Clip file names in playback order.
///
/// May be empty and may contain duplicates, unknown names or names without
/// the `.mp4` suffix; nothing is filtered until resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureSequence(Vec<String>);

impl GestureSequence {
    pub fn new(files: Vec<String>) -> Self {
        Self(files)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a GestureSequence {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
