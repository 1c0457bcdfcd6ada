use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::json_types::U128;
use near_sdk::serde::{Deserialize, Serialize};
use near_sdk::Balance;

use plcr::{poll_deadlines, PollError};

use crate::Track;

const DAY_MS: u64 = 86_400_000;

/// Settings for this contract
#[derive(BorshDeserialize, BorshSerialize, Clone)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct Settings {
    pub token_commit_window: u64,
    pub token_reveal_window: u64,
    pub token_quorum: u8,
    pub reputation_commit_window: u64,
    pub reputation_reveal_window: u64,
    pub reputation_quorum: u8,
    /// minimum attested stake for a side to count when a task is routed
    pub min_attestation: Balance,
    /// reputation granted on registration
    pub initial_reputation: Balance,
}

#[derive(BorshDeserialize, BorshSerialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug))]
pub enum VSettings {
    // Add old versions here, keep ordering, the oldest on top, most recent at bottom
    Current(Settings), // most recent version
}

/// Poll parameters of one track, windows in milliseconds.
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct TrackParams {
    pub commit_window: u64,
    pub reveal_window: u64,
    pub quorum: u8,
}

/// View JSON serializable representation of `Settings` data struct
#[derive(Default, Deserialize, Serialize)]
#[serde(crate = "near_sdk::serde", rename_all = "camelCase")]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
pub struct SettingsView {
    #[serde(default = "opt_default", skip_serializing_if = "Option::is_none")]
    pub token_commit_window: Option<u64>,
    #[serde(default = "opt_default", skip_serializing_if = "Option::is_none")]
    pub token_reveal_window: Option<u64>,
    #[serde(default = "opt_default", skip_serializing_if = "Option::is_none")]
    pub token_quorum: Option<u8>,
    #[serde(default = "opt_default", skip_serializing_if = "Option::is_none")]
    pub reputation_commit_window: Option<u64>,
    #[serde(default = "opt_default", skip_serializing_if = "Option::is_none")]
    pub reputation_reveal_window: Option<u64>,
    #[serde(default = "opt_default", skip_serializing_if = "Option::is_none")]
    pub reputation_quorum: Option<u8>,
    #[serde(default = "opt_default", skip_serializing_if = "Option::is_none")]
    pub min_attestation: Option<U128>,
    #[serde(default = "opt_default", skip_serializing_if = "Option::is_none")]
    pub initial_reputation: Option<U128>,
}

fn opt_default<T>() -> Option<T> {
    Option::<T>::None
}

impl Settings {
    /// Apply optionally provided changes to settings. Poll parameters of both tracks are
    /// validated, so a poll can always be opened with the resulting settings.
    fn apply_changes(mut self, settings_json: SettingsView) -> Result<Self, PollError> {
        if let Some(w) = settings_json.token_commit_window {
            self.token_commit_window = w;
        }
        if let Some(w) = settings_json.token_reveal_window {
            self.token_reveal_window = w;
        }
        if let Some(q) = settings_json.token_quorum {
            self.token_quorum = q;
        }
        if let Some(w) = settings_json.reputation_commit_window {
            self.reputation_commit_window = w;
        }
        if let Some(w) = settings_json.reputation_reveal_window {
            self.reputation_reveal_window = w;
        }
        if let Some(q) = settings_json.reputation_quorum {
            self.reputation_quorum = q;
        }
        if let Some(m) = settings_json.min_attestation {
            self.min_attestation = m.0;
        }
        if let Some(r) = settings_json.initial_reputation {
            self.initial_reputation = r.0;
        }

        for track in [Track::Token, Track::Reputation] {
            let p = self.track(track);
            poll_deadlines(0, p.commit_window, p.reveal_window, p.quorum)?;
        }
        Ok(self)
    }

    pub fn track(&self, track: Track) -> TrackParams {
        match track {
            Track::Token => TrackParams {
                commit_window: self.token_commit_window,
                reveal_window: self.token_reveal_window,
                quorum: self.token_quorum,
            },
            Track::Reputation => TrackParams {
                commit_window: self.reputation_commit_window,
                reveal_window: self.reputation_reveal_window,
                quorum: self.reputation_quorum,
            },
        }
    }
}

impl VSettings {
    /// Helper function to migrate settings to the current version and apply changes
    pub(crate) fn apply_changes(&self, settings_json: SettingsView) -> Result<Self, PollError> {
        Settings::from(self)
            .apply_changes(settings_json)
            .map(Into::into)
    }
}

fn default_window() -> u64 {
    7 * DAY_MS
}

fn default_quorum() -> u8 {
    50
}

fn default_min_attestation() -> Balance {
    1
}

fn default_initial_reputation() -> Balance {
    10_000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token_commit_window: default_window(),
            token_reveal_window: default_window(),
            token_quorum: default_quorum(),
            reputation_commit_window: default_window(),
            reputation_reveal_window: default_window(),
            reputation_quorum: default_quorum(),
            min_attestation: default_min_attestation(),
            initial_reputation: default_initial_reputation(),
        }
    }
}

impl From<&VSettings> for Settings {
    fn from(v_settings: &VSettings) -> Self {
        match v_settings {
            VSettings::Current(settings) => settings.clone(),
        }
    }
}

impl From<Settings> for VSettings {
    fn from(settings: Settings) -> Self {
        Self::Current(settings)
    }
}

impl From<Settings> for SettingsView {
    fn from(settings: Settings) -> Self {
        Self {
            token_commit_window: Some(settings.token_commit_window),
            token_reveal_window: Some(settings.token_reveal_window),
            token_quorum: Some(settings.token_quorum),
            reputation_commit_window: Some(settings.reputation_commit_window),
            reputation_reveal_window: Some(settings.reputation_reveal_window),
            reputation_quorum: Some(settings.reputation_quorum),
            min_attestation: Some(settings.min_attestation.into()),
            initial_reputation: Some(settings.initial_reputation.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn apply_changes() {
        let v: VSettings = Settings::default().into();
        let s = Settings::from(&v.apply_changes(SettingsView::default()).unwrap());
        assert_eq!(s, Settings::default());

        let changes = SettingsView {
            token_quorum: Some(70),
            reputation_reveal_window: Some(5),
            initial_reputation: Some(U128(3)),
            ..Default::default()
        };
        let s = Settings::from(&v.apply_changes(changes).unwrap());
        assert_eq!(s.token_quorum, 70);
        assert_eq!(s.reputation_quorum, 50);
        assert_eq!(
            s.track(Track::Reputation),
            TrackParams {
                commit_window: 7 * DAY_MS,
                reveal_window: 5,
                quorum: 50
            }
        );
        assert_eq!(s.initial_reputation, 3);
    }

    #[test]
    fn invalid_changes() {
        let v: VSettings = Settings::default().into();
        assert_matches!(
            v.apply_changes(SettingsView {
                reputation_quorum: Some(101),
                ..Default::default()
            }),
            Err(PollError::InvalidQuorum)
        );
        assert_matches!(
            v.apply_changes(SettingsView {
                token_commit_window: Some(0),
                ..Default::default()
            }),
            Err(PollError::InvalidWindow)
        );
        assert_matches!(
            v.apply_changes(SettingsView {
                token_commit_window: Some(u64::MAX),
                ..Default::default()
            }),
            Err(PollError::InvalidWindow)
        );
    }

    #[test]
    fn view_json() {
        let view = SettingsView::from(Settings::default());
        let json = near_sdk::serde_json::to_string(&view).unwrap();
        assert!(json.contains(r#""tokenQuorum":50"#));
        assert!(json.contains(r#""initialReputation":"10000""#));

        let parsed: SettingsView =
            near_sdk::serde_json::from_str(r#"{"reputationQuorum":60}"#).unwrap();
        assert_eq!(
            parsed,
            SettingsView {
                reputation_quorum: Some(60),
                ..Default::default()
            }
        );
    }
}
