pub mod allocation;
pub mod leaf;
pub mod merkle;
pub mod proof;
pub mod whitelist;
