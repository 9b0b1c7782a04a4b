use soroban_sdk::{contracttype, panic_with_error, Env};

use crate::storage_types::{CampaignError, CampaignId};

#[derive(Clone)]
#[contracttype]
enum GuardKey {
    Busy(CampaignId),
}

/// Scoped non-reentrant lock for one campaign.
///
/// The flag lives in temporary storage: a nested acquire within the same
/// invocation fails fast, a panic rolls the flag back with the rest of the
/// call, and a completed call releases it on drop.
pub struct ReentrancyGuard {
    env: Env,
    campaign_id: CampaignId,
}

impl ReentrancyGuard {
    pub fn acquire(env: &Env, campaign_id: CampaignId) -> Self {
        match Self::try_acquire(env, campaign_id) {
            Ok(guard) => guard,
            Err(err) => panic_with_error!(env, err),
        }
    }

    pub fn try_acquire(env: &Env, campaign_id: CampaignId) -> Result<Self, CampaignError> {
        let key = GuardKey::Busy(campaign_id);
        if env.storage().temporary().has(&key) {
            return Err(CampaignError::ReentrancyDetected);
        }
        env.storage().temporary().set(&key, &true);
        Ok(Self {
            env: env.clone(),
            campaign_id,
        })
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        self.env
            .storage()
            .temporary()
            .remove(&GuardKey::Busy(self.campaign_id));
    }
}
