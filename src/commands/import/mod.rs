//! The `import` command: documentation pages and SDK headers into the store.

mod context;
mod events;
mod keyids;
mod run;
mod simvars;
mod units;
#[cfg(test)]
mod tests;

pub use run::run;
