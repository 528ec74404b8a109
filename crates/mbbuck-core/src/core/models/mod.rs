pub mod block;
pub mod cell;
