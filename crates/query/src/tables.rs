use chq_primitives::Name;


// Source tables are owned by the external indexing pipeline. Their names
// are trusted structural constants and never come from user input.

pub const BLOCK_HISTORY: Name = "block_history";

pub const BALANCE_HISTORY: Name = "balance_history";

pub const HERMES_CONTRACT: Name = "hermes_contract";

pub const VOTING_RESULT: Name = "voting_result";
