mod game_to_ledger;
mod pipeline_failures;
