pub mod chart_service;
pub mod chat_panel;
pub mod credits_store;
pub mod debounce;
pub mod payment_service;
pub mod series_service;
pub mod suggestion_service;
