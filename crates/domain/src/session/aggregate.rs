//! Voting session aggregate implementation.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use common::{CandidateId, SessionId, Version, VoterId};
use serde::{Deserialize, Serialize};

use crate::ports::{Clock, IdGenerator, SystemClock};

use super::{ClosedData, CreatedData, VotedData, VotingSessionError, VotingStatus};

/// Voting session aggregate root.
///
/// Every revision is an immutable value: operations never mutate `self`,
/// they return an event that carries the next revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingSession {
    id: SessionId,
    name: String,
    candidates: Vec<CandidateId>,
    status: VotingStatus,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    version: Version,
    /// Voters per candidate, in the order they voted. A voter appears at most
    /// once across all lists.
    votes: BTreeMap<CandidateId, Vec<VoterId>>,
}

// Query methods
impl VotingSession {
    /// Returns a builder for restoring a session from stored state.
    pub fn builder() -> VotingSessionBuilder {
        VotingSessionBuilder::default()
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[CandidateId] {
        &self.candidates
    }

    pub fn status(&self) -> VotingStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// Returns the revision this value was read at (0 if never persisted).
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the voters of every candidate that received at least one vote.
    pub fn votes(&self) -> &BTreeMap<CandidateId, Vec<VoterId>> {
        &self.votes
    }

    /// Returns the voters for a candidate, in voting order.
    pub fn votes_for(&self, candidate_id: CandidateId) -> &[VoterId] {
        self.votes
            .get(&candidate_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the number of ballots cast across all candidates.
    pub fn total_votes(&self) -> usize {
        self.votes.values().map(Vec::len).sum()
    }

    /// Returns true if the voter already voted for any candidate.
    pub fn has_voted(&self, voter_id: VoterId) -> bool {
        self.votes.values().any(|voters| voters.contains(&voter_id))
    }

    pub fn is_open(&self) -> bool {
        self.status == VotingStatus::Open
    }

    /// Returns a copy of this revision stamped with another version.
    ///
    /// Used by repositories once a revision has been stored.
    pub fn with_version(&self, version: Version) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }
}

// Transitions (return events carrying the next revision)
impl VotingSession {
    /// Creates a new open session.
    ///
    /// The id comes from `id_generator` and the creation time from `clock`;
    /// the session is not persisted (version 0).
    pub fn create(
        name: impl Into<String>,
        candidates: Vec<CandidateId>,
        id_generator: &dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<CreatedData, VotingSessionError> {
        if candidates.len() < 2 {
            return Err(VotingSessionError::AtLeastTwoCandidates);
        }

        let mut seen = HashSet::with_capacity(candidates.len());
        if !candidates.iter().all(|candidate| seen.insert(*candidate)) {
            return Err(VotingSessionError::RepeatedCandidateId);
        }

        let session = Self {
            id: id_generator.next_id(),
            name: name.into(),
            candidates,
            status: VotingStatus::Open,
            created_at: clock.now(),
            closed_at: None,
            version: Version::initial(),
            votes: BTreeMap::new(),
        };

        Ok(CreatedData { session })
    }

    /// Records a vote of `voter_id` for `candidate_id`.
    pub fn vote_for(
        &self,
        candidate_id: CandidateId,
        voter_id: VoterId,
    ) -> Result<VotedData, VotingSessionError> {
        if !self.status.can_vote() {
            return Err(VotingSessionError::VotingClosed);
        }

        if !self.candidates.contains(&candidate_id) {
            return Err(VotingSessionError::NotPresentCandidateId);
        }

        if self.has_voted(voter_id) {
            return Err(VotingSessionError::AlreadyVoted);
        }

        let mut votes = self.votes.clone();
        votes.entry(candidate_id).or_default().push(voter_id);

        Ok(VotedData {
            session: Self {
                votes,
                ..self.clone()
            },
            candidate_id,
            voter_id,
        })
    }

    /// Closes the session. Closing twice is an error.
    pub fn close(&self, clock: &dyn Clock) -> Result<ClosedData, VotingSessionError> {
        if !self.status.can_close() {
            return Err(VotingSessionError::VotingClosed);
        }

        Ok(ClosedData {
            session: Self {
                status: VotingStatus::Closed,
                closed_at: Some(clock.now()),
                ..self.clone()
            },
        })
    }

    /// Returns every candidate holding the highest vote count, in candidate
    /// id order.
    ///
    /// Only candidates with at least one vote compete, so a session where
    /// nobody voted has no winners.
    pub fn winners(&self) -> Result<Vec<CandidateId>, VotingSessionError> {
        if self.status != VotingStatus::Closed {
            return Err(VotingSessionError::VotingStillOpen);
        }

        let Some(max_votes) = self
            .votes
            .values()
            .map(Vec::len)
            .filter(|count| *count > 0)
            .max()
        else {
            return Ok(Vec::new());
        };

        Ok(self
            .votes
            .iter()
            .filter(|(_, voters)| voters.len() == max_votes)
            .map(|(candidate_id, _)| *candidate_id)
            .collect())
    }
}

/// Builder for voting sessions restored from storage or prepared in tests.
///
/// No validation is performed; the stored state is trusted as-is.
#[derive(Debug, Default)]
pub struct VotingSessionBuilder {
    id: Option<SessionId>,
    name: String,
    candidates: Vec<CandidateId>,
    status: VotingStatus,
    created_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    version: Version,
    votes: BTreeMap<CandidateId, Vec<VoterId>>,
}

impl VotingSessionBuilder {
    /// Sets the session id. If not set, a new id is generated.
    pub fn id(mut self, id: SessionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn candidates(mut self, candidates: Vec<CandidateId>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn status(mut self, status: VotingStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the creation time. If not set, the current time is used.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn closed_at(mut self, closed_at: Option<DateTime<Utc>>) -> Self {
        self.closed_at = closed_at;
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn votes(mut self, votes: BTreeMap<CandidateId, Vec<VoterId>>) -> Self {
        self.votes = votes;
        self
    }

    pub fn build(self) -> VotingSession {
        VotingSession {
            id: self.id.unwrap_or_default(),
            name: self.name,
            candidates: self.candidates,
            status: self.status,
            created_at: self.created_at.unwrap_or_else(|| SystemClock.now()),
            closed_at: self.closed_at,
            version: self.version,
            votes: self.votes,
        }
    }
}
