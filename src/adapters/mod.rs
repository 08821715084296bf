// Adapters layer: concrete implementations for external systems (oracle http, listing input).

pub mod candidates;
pub mod openai;
pub mod row_text;
