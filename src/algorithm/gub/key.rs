//! # Key variables and basic members
//!
//! Every set has exactly one key: a basic member, or its own slack. The key is not part of the
//! basis heading; the implicit row of the set determines its value. The other basic members of a
//! set are kept in a list per set, rebuilt whenever membership changes.

/// A member of a set, relative to that set.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Member {
    /// A structural column.
    Column(usize),
    /// The slack of the set.
    Slack,
}

impl Member {
    /// The structural column, if this is not the slack.
    #[must_use]
    pub fn column(self) -> Option<usize> {
        match self {
            Self::Column(j) => Some(j),
            Self::Slack => None,
        }
    }

    /// Index used in external views: the column, or `nr_columns + set` for the slack.
    #[must_use]
    pub fn to_sequence(self, set: usize, nr_columns: usize) -> usize {
        match self {
            Self::Column(j) => j,
            Self::Slack => nr_columns + set,
        }
    }
}

/// Key and other basic members of a single set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BasicMembers {
    key: Member,
    others: Vec<usize>,
}

impl BasicMembers {
    /// The key.
    #[must_use]
    pub fn key(&self) -> Member {
        self.key
    }

    /// Basic structural members other than the key.
    #[must_use]
    pub fn others(&self) -> &[usize] {
        &self.others
    }

    /// All basic members, starting with the key.
    pub fn iter(&self) -> impl Iterator<Item = Member> + '_ {
        std::iter::once(self.key).chain(self.others.iter().map(|&j| Member::Column(j)))
    }
}

/// Keys and basic members of all sets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyAssignment {
    sets: Vec<BasicMembers>,
}

impl KeyAssignment {
    /// Every set has its slack as key and no other basic members.
    #[must_use]
    pub fn slack_keys(nr_sets: usize) -> Self {
        Self {
            sets: vec![BasicMembers { key: Member::Slack, others: Vec::new() }; nr_sets],
        }
    }

    /// Key of a set.
    #[must_use]
    pub fn key(&self, set: usize) -> Member {
        self.sets[set].key
    }

    /// Structural key of a set, `None` when the slack is the key.
    #[must_use]
    pub fn key_column(&self, set: usize) -> Option<usize> {
        self.sets[set].key.column()
    }

    /// Key and other basic members of a set.
    #[must_use]
    pub fn members(&self, set: usize) -> &BasicMembers {
        &self.sets[set]
    }

    /// Whether a column is the key of its set.
    #[must_use]
    pub fn is_key(&self, set: usize, column: usize) -> bool {
        self.sets[set].key == Member::Column(column)
    }

    /// Replace the key and rebuild the list of other basic members.
    ///
    /// # Arguments
    ///
    /// * `set`: Index of the set.
    /// * `key`: The new key.
    /// * `basic_columns`: All basic structural members of the set; the key is skipped if present.
    pub fn relink(&mut self, set: usize, key: Member, basic_columns: impl Iterator<Item = usize>) {
        let members = &mut self.sets[set];
        members.key = key;
        members.others.clear();
        members.others.extend(basic_columns.filter(|&j| Member::Column(j) != key));
    }

    /// Number of sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether there are no sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::gub::key::{KeyAssignment, Member};

    #[test]
    fn relink() {
        let mut keys = KeyAssignment::slack_keys(2);
        assert_eq!(keys.key(1), Member::Slack);

        keys.relink(1, Member::Column(4), [3, 4, 6].into_iter());
        assert_eq!(keys.key_column(1), Some(4));
        assert_eq!(keys.members(1).others(), &[3, 6]);
        assert_eq!(
            keys.members(1).iter().collect::<Vec<_>>(),
            vec![Member::Column(4), Member::Column(3), Member::Column(6)],
        );
        assert!(keys.is_key(1, 4));
        assert!(!keys.is_key(0, 4));
    }

    #[test]
    fn sequence() {
        assert_eq!(Member::Slack.to_sequence(2, 10), 12);
        assert_eq!(Member::Column(3).to_sequence(2, 10), 3);
    }
}
