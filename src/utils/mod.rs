pub mod serde_num;
