use serde::{Deserialize, Serialize};
use skirmish_core::{Battle, BattleSetup, Outcome, ReplayLog};

use super::{RepositoryError, Result};

/// A finished (or interrupted) battle in replayable form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub setup: BattleSetup,
    pub log: ReplayLog,
    pub outcome: Option<Outcome>,
    /// Digest of the final state.
    pub digest: [u8; 32],
}

impl ReplayRecord {
    /// Rebuilds the battle and checks it ends on the recorded digest.
    pub fn verify(&self) -> Result<Battle> {
        let battle = Battle::replay(self.setup.clone(), &self.log)?;
        let actual = battle.digest();
        if actual != self.digest {
            return Err(RepositoryError::DigestMismatch {
                expected: hex::encode(self.digest),
                actual: hex::encode(actual),
            });
        }
        Ok(battle)
    }
}
