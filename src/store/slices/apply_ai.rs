//! Automatic applications: suggested offers, history and preferences

use serde::{Deserialize, Serialize};

use crate::models::{AiSuggestion, ApplyAiConfig};
use crate::store::Collection;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyAiData {
    pub suggestions: Collection<AiSuggestion>,
    pub history: Collection<AiSuggestion>,
    pub config: Option<ApplyAiConfig>,
}

impl ApplyAiData {
    pub fn mark_applied(&mut self, job_id: u64, date: String) {
        if let Some(mut suggestion) = self.suggestions.get(&job_id).cloned() {
            suggestion.applied = true;
            suggestion.applied_date = Some(date);
            self.suggestions.update(suggestion);
        }
    }

    /// Switch answers only carry the flag; without a loaded config a default one holds it
    pub fn set_auto_apply(&mut self, enabled: bool) {
        self.config.get_or_insert_with(ApplyAiConfig::default).auto_apply_enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(id: u64) -> AiSuggestion {
        serde_json::from_value(serde_json::json!({"id": id, "titre": "Barista"})).unwrap()
    }

    #[test]
    fn test_mark_applied_touches_matching_suggestion() {
        let mut data = ApplyAiData::default();
        data.suggestions.replace(vec![suggestion(1), suggestion(2)]);
        data.mark_applied(2, "2025-05-02".into());
        data.mark_applied(99, "2025-05-02".into());

        let applied: Vec<bool> = data.suggestions.items().iter().map(|s| s.applied).collect();
        assert_eq!(applied, vec![false, true]);
        assert_eq!(data.suggestions.get(&2).and_then(|s| s.applied_date.clone()).as_deref(), Some("2025-05-02"));
    }

    #[test]
    fn test_auto_apply_switch_keeps_preferences() {
        let mut data = ApplyAiData::default();
        data.set_auto_apply(true);
        assert!(data.config.as_ref().map_or(false, |c| c.auto_apply_enabled));

        data.config = Some(ApplyAiConfig {
            job_preferences: vec!["cuisine".into()],
            ..Default::default()
        });
        data.set_auto_apply(false);
        let config = data.config.unwrap();
        assert!(!config.auto_apply_enabled);
        assert_eq!(config.job_preferences, vec!["cuisine".to_string()]);
    }
}
