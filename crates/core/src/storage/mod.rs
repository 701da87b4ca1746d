pub mod picks;
