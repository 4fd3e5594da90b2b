pub mod auto_advance;
