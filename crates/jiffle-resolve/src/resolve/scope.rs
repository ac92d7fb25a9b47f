//! Symbols and the scope stack.
//!
//! The classifier threads a [`ScopeStack`] through the script. Frames are
//! pushed in a fixed order before the body is visited:
//!
//! ```text
//! frame 0   images and built-in constants
//! frame 1   init block (image-scope variables)
//! frame 2   pixel body
//! frame 3+  blocks, branches and loop bodies
//! ```
//!
//! Lookups search from the innermost frame outwards, so a loop variable
//! shadows an outer name for the duration of its body.

use indexmap::IndexMap;

/// What a name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    SourceImage,
    DestImage,
    /// User variable holding a scalar or a list
    Scalar,
    /// `foreach` loop variable
    LoopVar,
    /// Built-in named constant
    Constant,
}

/// Lifetime of a symbol's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeType {
    /// Lives for a whole pass over the image
    Image,
    /// Lives for the evaluation of one pixel
    Pixel,
}

/// A named entry in a scope frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub symbol_type: SymbolType,
    pub scope_type: ScopeType,
    /// Index into the table matching `symbol_type`: variable slot for
    /// `Scalar`/`LoopVar`, image index for images, position in
    /// `CONSTANTS` for constants.
    pub slot: usize,
}

impl Symbol {
    pub fn new(name: impl Into<String>, symbol_type: SymbolType, scope_type: ScopeType, slot: usize) -> Self {
        Self {
            name: name.into(),
            symbol_type,
            scope_type,
            slot,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self.symbol_type, SymbolType::SourceImage | SymbolType::DestImage)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.symbol_type, SymbolType::Scalar | SymbolType::LoopVar)
    }
}

/// Why [`ScopeStack::add_symbol`] refused a symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeError {
    /// No frame is open
    NoFrame,
    /// The innermost frame already holds a symbol with this name
    Duplicate(Symbol),
}

/// Stack of name → symbol frames.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<IndexMap<String, Symbol>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new innermost frame.
    pub fn add_level(&mut self) {
        self.frames.push(IndexMap::new());
    }

    /// Close the innermost frame. Returns `false` if no frame was open.
    pub fn drop_level(&mut self) -> bool {
        self.frames.pop().is_some()
    }

    /// Declare a symbol in the innermost frame.
    pub fn add_symbol(&mut self, symbol: Symbol) -> Result<(), ScopeError> {
        let frame = self.frames.last_mut().ok_or(ScopeError::NoFrame)?;
        if let Some(existing) = frame.get(&symbol.name) {
            return Err(ScopeError::Duplicate(existing.clone()));
        }
        frame.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Innermost symbol with this name.
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Symbol with this name in the innermost frame only.
    pub fn get_local(&self, name: &str) -> Option<&Symbol> {
        self.frames.last()?.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// True if the innermost symbol with this name has the given type.
    pub fn is_defined_as(&self, name: &str, symbol_type: SymbolType) -> bool {
        self.get(name).is_some_and(|s| s.symbol_type == symbol_type)
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(name: &str) -> Symbol {
        Symbol::new(name, SymbolType::Scalar, ScopeType::Pixel, 0)
    }

    #[test]
    fn test_symbol_visible_until_its_frame_drops() {
        let mut scopes = ScopeStack::new();
        scopes.add_level();
        scopes.add_symbol(scalar("outer")).unwrap();
        scopes.add_level();
        scopes.add_symbol(scalar("inner")).unwrap();
        assert!(scopes.is_defined("outer"));
        assert!(scopes.is_defined("inner"));

        assert!(scopes.drop_level());
        assert!(scopes.is_defined("outer"));
        assert!(!scopes.is_defined("inner"));

        assert!(scopes.drop_level());
        assert!(!scopes.is_defined("outer"));
        assert!(scopes.is_empty());
        assert!(!scopes.drop_level());
    }

    #[test]
    fn test_inner_frame_shadows_outer() {
        let mut scopes = ScopeStack::new();
        scopes.add_level();
        scopes.add_symbol(scalar("i")).unwrap();
        scopes.add_level();
        scopes
            .add_symbol(Symbol::new("i", SymbolType::LoopVar, ScopeType::Pixel, 1))
            .unwrap();
        assert!(scopes.is_defined_as("i", SymbolType::LoopVar));
        scopes.drop_level();
        assert!(scopes.is_defined_as("i", SymbolType::Scalar));
    }

    #[test]
    fn test_duplicate_in_same_frame_is_refused() {
        let mut scopes = ScopeStack::new();
        assert_eq!(scopes.add_symbol(scalar("x")), Err(ScopeError::NoFrame));
        scopes.add_level();
        scopes.add_symbol(scalar("x")).unwrap();
        assert!(matches!(
            scopes.add_symbol(scalar("x")),
            Err(ScopeError::Duplicate(_))
        ));
        assert!(scopes.get_local("x").is_some());
        assert_eq!(scopes.depth(), 1);
    }
}
