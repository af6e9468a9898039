pub mod aggregation;
pub mod dto;
pub mod entry_service;
pub mod filter;
pub mod live_entries;
