pub mod debounce;
pub mod local_store;
pub mod poll;
