pub mod logging;

// Roster expansion: reference graph, balanced cloning, weighted names
pub mod roster;
