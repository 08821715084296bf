// Application layer: what the binaries do with a plan once the core is done.

pub mod record;
