use rootstore_core::index::KeyBinding;

/// Options when opening an [`crate::AuthenticatedTree`] or [`crate::AuthenticatedMap`].
#[derive(Debug, Clone)]
pub struct Options {
    /// The height of the tree. The tree has `2^height` leaves.
    pub(crate) height: u8,
    /// How map entries are encoded as leaves. Ignored by plain trees.
    pub(crate) key_binding: KeyBinding,
}

impl Options {
    /// Create a new `Options` instance with the default values.
    pub fn new() -> Self {
        Self {
            height: 20,
            key_binding: KeyBinding::Unbound,
        }
    }

    /// Set the height of the tree.
    ///
    /// Must be in `1..=`[`rootstore_core::MAX_HEIGHT`]. This is checked when the tree is opened.
    ///
    /// Default: 20.
    pub fn height(&mut self, height: u8) {
        self.height = height;
    }

    /// Set how map entries are encoded as leaves.
    ///
    /// Default: [`KeyBinding::Unbound`].
    pub fn key_binding(&mut self, key_binding: KeyBinding) {
        self.key_binding = key_binding;
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
