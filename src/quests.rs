use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestEvent {
    EnemyKill,
    BossKill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub event: QuestEvent,
    pub target: u32,
    pub reward_coins: u32,
    pub reward_exp: u32,
    pub prerequisite: Option<&'static str>,
}

pub static QUESTS: [QuestDefinition; 2] = [
    QuestDefinition {
        id: "quest1",
        name: "Defeat 5 Enemies",
        description: "Clear the enemy territory of threats",
        event: QuestEvent::EnemyKill,
        target: 5,
        reward_coins: 100,
        reward_exp: 50,
        prerequisite: None,
    },
    QuestDefinition {
        id: "quest2",
        name: "Defeat the Boss",
        description: "Challenge the Raid Boss in the arena",
        event: QuestEvent::BossKill,
        target: 1,
        reward_coins: 500,
        reward_exp: 200,
        prerequisite: Some("quest1"),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestProgress {
    pub active: bool,
    pub progress: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestStatus {
    Locked,
    Offerable,
    Active { progress: u32, target: u32 },
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestReward {
    pub coins: u32,
    pub exp: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestError {
    #[error("no quest with id {0}")]
    UnknownQuest(String),
    #[error("quest {0} cannot be accepted right now")]
    NotOfferable(&'static str),
    #[error("quest {0} is not ready to be claimed")]
    NotClaimable(&'static str),
}

/// Receives combat progress signals. Returns the ids of quests that just reached their target.
pub trait QuestSink {
    fn record(&mut self, event: QuestEvent, amount: u32) -> Vec<&'static str>;
}

/// Quest table with explicit claiming: reaching the target never completes a quest by itself.
#[derive(Debug, Clone)]
pub struct QuestBook {
    entries: Vec<(&'static QuestDefinition, QuestProgress)>,
}

impl Default for QuestBook {
    fn default() -> Self { Self { entries: QUESTS.iter().map(|def| (def, QuestProgress::default())).collect() } }
}

impl QuestBook {
    fn index_of(&self, id: &str) -> Result<usize, QuestError> {
        self.entries.iter().position(|(def, _)| def.id == id).ok_or_else(|| QuestError::UnknownQuest(id.to_string()))
    }

    fn prerequisite_met(&self, def: &QuestDefinition) -> bool {
        def.prerequisite.map_or(true, |pre| self.progress(pre).is_some_and(|p| p.completed))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &'static QuestDefinition> + '_ { self.entries.iter().map(|(def, _)| *def) }

    pub fn progress(&self, id: &str) -> Option<QuestProgress> {
        self.entries.iter().find(|(def, _)| def.id == id).map(|(_, progress)| *progress)
    }

    pub fn status(&self, id: &str) -> Option<QuestStatus> {
        let (def, progress) = self.entries.iter().find(|(def, _)| def.id == id)?;
        Some(if progress.completed {
            QuestStatus::Completed
        } else if progress.active {
            QuestStatus::Active { progress: progress.progress, target: def.target }
        } else if self.prerequisite_met(def) {
            QuestStatus::Offerable
        } else {
            QuestStatus::Locked
        })
    }

    pub fn is_offerable(&self, id: &str) -> bool { self.status(id) == Some(QuestStatus::Offerable) }

    pub fn any_offerable(&self) -> bool { self.definitions().any(|def| self.is_offerable(def.id)) }

    pub fn active(&self) -> impl Iterator<Item = (&'static QuestDefinition, QuestProgress)> + '_ {
        self.entries.iter().filter(|(_, progress)| progress.active).map(|(def, progress)| (*def, *progress))
    }

    pub fn accept(&mut self, id: &str) -> Result<&'static QuestDefinition, QuestError> {
        let index = self.index_of(id)?;
        let def = self.entries[index].0;
        if !self.is_offerable(def.id) {
            return Err(QuestError::NotOfferable(def.id));
        }
        self.entries[index].1 = QuestProgress { active: true, progress: 0, completed: false };
        Ok(def)
    }

    /// Completes an active quest whose target is reached and hands back its reward.
    pub fn claim(&mut self, id: &str) -> Result<QuestReward, QuestError> {
        let index = self.index_of(id)?;
        let (def, progress) = &mut self.entries[index];
        if !progress.active || progress.progress < def.target {
            return Err(QuestError::NotClaimable(def.id));
        }
        *progress = QuestProgress { active: false, progress: def.target, completed: true };
        Ok(QuestReward { coins: def.reward_coins, exp: def.reward_exp })
    }

    /// Loads saved progress. Entries whose prerequisite is incomplete are reset.
    pub fn restore(&mut self, saved: impl IntoIterator<Item = (String, QuestProgress)>) {
        for (id, progress) in saved {
            if let Ok(index) = self.index_of(&id) {
                let target = self.entries[index].0.target;
                self.entries[index].1 = QuestProgress { progress: progress.progress.min(target), ..progress };
            }
        }
        for index in 0..self.entries.len() {
            let def = self.entries[index].0;
            if !self.prerequisite_met(def) {
                self.entries[index].1 = QuestProgress::default();
            }
        }
    }

    pub fn snapshot(&self) -> Vec<(&'static str, QuestProgress)> { self.entries.iter().map(|(def, progress)| (def.id, *progress)).collect() }
}

impl QuestSink for QuestBook {
    fn record(&mut self, event: QuestEvent, amount: u32) -> Vec<&'static str> {
        let mut reached = Vec::new();
        for (def, progress) in self.entries.iter_mut() {
            if !progress.active || progress.completed || def.event != event {
                continue;
            }
            let before = progress.progress;
            progress.progress = (progress.progress + amount).min(def.target);
            if before < def.target && progress.progress >= def.target {
                reached.push(def.id);
            }
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped_and_reported_once() {
        let mut book = QuestBook::default();
        assert!(book.accept("quest1").is_ok());
        assert!(book.record(QuestEvent::EnemyKill, 4).is_empty());
        assert_eq!(book.record(QuestEvent::EnemyKill, 3), vec!["quest1"]);
        assert!(book.record(QuestEvent::EnemyKill, 1).is_empty());
        assert_eq!(book.progress("quest1").map(|p| p.progress), Some(5));
        assert!(!book.progress("quest1").is_some_and(|p| p.completed));
    }

    #[test]
    fn inactive_quests_ignore_events() {
        let mut book = QuestBook::default();
        assert!(book.record(QuestEvent::EnemyKill, 10).is_empty());
        assert_eq!(book.progress("quest1"), Some(QuestProgress::default()));
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut book = QuestBook::default();
        assert_eq!(book.accept("quest9").err(), Some(QuestError::UnknownQuest("quest9".into())));
    }

    #[test]
    fn restore_drops_states_with_unmet_prerequisites() {
        let mut book = QuestBook::default();
        book.restore(vec![("quest2".to_string(), QuestProgress { active: true, progress: 1, completed: false })]);
        assert_eq!(book.status("quest2"), Some(QuestStatus::Locked));
        book.restore(vec![
            ("quest1".to_string(), QuestProgress { active: false, progress: 9, completed: true }),
            ("quest2".to_string(), QuestProgress { active: true, progress: 0, completed: false }),
        ]);
        assert_eq!(book.progress("quest1").map(|p| p.progress), Some(5));
        assert_eq!(book.status("quest2"), Some(QuestStatus::Active { progress: 0, target: 1 }));
    }
}
