use serde::{Deserialize, Serialize};

/// One autocomplete entry from `/symbols`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSuggestion {
    pub symbol: String,
    pub name: String,
}

impl SymbolSuggestion {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    /// `"AAPL - Apple Inc."`, the label shown in the dropdown.
    pub fn label(&self) -> String {
        format!("{} - {}", self.symbol, self.name)
    }
}

/// What the symbol box committed: free text or a picked suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolSelection {
    Text(String),
    Suggestion(SymbolSuggestion),
}

impl SymbolSelection {
    /// Uppercased ticker, or `None` when nothing usable was selected.
    pub fn normalized(&self) -> Option<String> {
        let raw = match self {
            SymbolSelection::Text(text) => text.as_str(),
            SymbolSelection::Suggestion(s) => s.symbol.as_str(),
        };
        if raw.is_empty() {
            None
        } else {
            Some(raw.to_uppercase())
        }
    }
}

/// Why the symbol input changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputChangeReason {
    /// The user typed.
    Input,
    /// The clear button was pressed.
    Clear,
    /// The widget reset the text after a selection; ignored.
    Reset,
}
