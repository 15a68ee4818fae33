//! End-to-end tests of the voting use cases over the in-memory repository.

use std::sync::{Arc, Mutex};

use application::{InProcessEventPublisher, ServiceError, VotingService, VotingSessionEventListener};
use async_trait::async_trait;
use domain::{
    CandidateId, RepositoryError, SessionId, SystemClock, Version, VoterId, VotingSession,
    VotingSessionError, VotingSessionEvent, VotingSessionRepository, VotingStatus,
};
use session_store::InMemorySessionRepository;

#[derive(Clone, Default)]
struct Collector {
    events: Arc<Mutex<Vec<VotingSessionEvent>>>,
}

impl Collector {
    fn types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(VotingSessionEvent::event_type)
            .collect()
    }
}

impl VotingSessionEventListener for Collector {
    fn name(&self) -> &'static str {
        "collector"
    }

    fn on_event(&self, event: &VotingSessionEvent) -> Result<(), application::ListenerError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Listener with a bug: panics on every event.
struct Exploding;

impl VotingSessionEventListener for Exploding {
    fn name(&self) -> &'static str {
        "exploding"
    }

    fn on_event(&self, _event: &VotingSessionEvent) -> Result<(), application::ListenerError> {
        panic!("listener bug")
    }
}

fn service_over<R: VotingSessionRepository>(repository: R) -> (VotingService<R>, Collector) {
    let collector = Collector::default();
    let publisher = InProcessEventPublisher::with_default_listeners().with_listener(collector.clone());
    (VotingService::new(repository, Arc::new(publisher)), collector)
}

/// Saves always fail; finds go to the wrapped repository.
struct BrokenStorage {
    inner: InMemorySessionRepository,
}

#[async_trait]
impl VotingSessionRepository for BrokenStorage {
    async fn find(&self, id: SessionId) -> Result<VotingSession, RepositoryError> {
        self.inner.find(id).await
    }

    async fn save(&self, _session: &VotingSession) -> Result<Version, RepositoryError> {
        Err(RepositoryError::backend(std::io::Error::other("disk full")))
    }
}

/// Lets a competing writer close the session between every find and the
/// caller's save, so the caller always holds a stale revision.
struct ClosedBehindYourBack {
    inner: InMemorySessionRepository,
}

#[async_trait]
impl VotingSessionRepository for ClosedBehindYourBack {
    async fn find(&self, id: SessionId) -> Result<VotingSession, RepositoryError> {
        let loaded = self.inner.find(id).await?;
        if let Ok(closed) = loaded.close(&SystemClock) {
            self.inner.save(&closed.session).await?;
        }
        Ok(loaded)
    }

    async fn save(&self, session: &VotingSession) -> Result<Version, RepositoryError> {
        self.inner.save(session).await
    }
}

#[tokio::test]
async fn best_dish_lifecycle() {
    let (service, collector) = service_over(InMemorySessionRepository::new());
    let pasta = CandidateId::new();
    let sushi = CandidateId::new();
    let tacos = CandidateId::new();

    let id = service
        .create("Best dish".to_string(), vec![pasta, sushi, tacos])
        .await
        .unwrap();

    for candidate in [pasta, sushi, pasta, sushi, tacos] {
        service.vote(id, candidate, VoterId::new()).await.unwrap();
    }
    service.close(id).await.unwrap();

    let mut winners = service.winners(id).await.unwrap();
    winners.sort();
    let mut expected = vec![pasta, sushi];
    expected.sort();
    assert_eq!(winners, expected);

    let session = service.get(id).await.unwrap();
    assert_eq!(session.status(), VotingStatus::Closed);
    assert_eq!(session.total_votes(), 5);
    assert_eq!(session.version(), Version::new(7));

    assert_eq!(
        collector.types(),
        vec!["Created", "Voted", "Voted", "Voted", "Voted", "Voted", "Closed"]
    );
}

#[tokio::test]
async fn voted_event_names_candidate_and_voter() {
    let (service, collector) = service_over(InMemorySessionRepository::new());
    let candidates = vec![CandidateId::new(), CandidateId::new()];
    let id = service.create("Lunch".to_string(), candidates.clone()).await.unwrap();
    let voter = VoterId::new();

    service.vote(id, candidates[1], voter).await.unwrap();

    let events = collector.events.lock().unwrap();
    match &events[1] {
        VotingSessionEvent::Voted(data) => {
            assert_eq!(data.candidate_id, candidates[1]);
            assert_eq!(data.voter_id, voter);
            assert_eq!(data.session.id(), id);
            assert_eq!(data.session.votes_for(candidates[1]), &[voter]);
        }
        other => panic!("expected a Voted event, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_save_publishes_nothing() {
    let inner = InMemorySessionRepository::new();
    let session = VotingSession::builder()
        .name("Lunch")
        .candidates(vec![CandidateId::new(), CandidateId::new()])
        .build();
    inner.save(&session).await.unwrap();
    let candidate = session.candidates()[0];

    let (service, collector) = service_over(BrokenStorage { inner });

    let err = service
        .vote(session.id(), candidate, VoterId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repository(RepositoryError::Backend(_))));
    assert!(!err.is_retryable());

    let err = service.close(session.id()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Repository(RepositoryError::Backend(_))));

    assert!(collector.types().is_empty());
}

#[tokio::test]
async fn losing_the_race_is_retryable_and_unpublished() {
    let inner = InMemorySessionRepository::new();
    let (setup, _) = service_over(inner.clone());
    let candidates = vec![CandidateId::new(), CandidateId::new()];
    let id = setup.create("Lunch".to_string(), candidates.clone()).await.unwrap();

    let (service, collector) = service_over(ClosedBehindYourBack { inner: inner.clone() });

    let err = service
        .vote(id, candidates[0], VoterId::new())
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(collector.types().is_empty());

    // The competing close won; repeating the call now sees it.
    let err = service
        .vote(id, candidates[0], VoterId::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(VotingSessionError::VotingClosed)
    ));

    let stored = inner.find(id).await.unwrap();
    assert_eq!(stored.status(), VotingStatus::Closed);
    assert_eq!(stored.total_votes(), 0);
}

#[tokio::test]
async fn concurrent_voters_never_lose_a_ballot() {
    let repository = InMemorySessionRepository::new();
    let (service, collector) = service_over(repository.clone());
    let candidates = vec![CandidateId::new(), CandidateId::new()];
    let id = service.create("Lunch".to_string(), candidates.clone()).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let service = service.clone();
        let candidate = candidates[i % 2];
        handles.push(tokio::spawn(async move {
            let voter = VoterId::new();
            loop {
                match service.vote(id, candidate, voter).await {
                    Ok(()) => return,
                    Err(err) if err.is_retryable() => continue,
                    Err(err) => panic!("unexpected error: {err}"),
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = repository.find(id).await.unwrap();
    assert_eq!(stored.total_votes(), 16);
    assert_eq!(stored.version(), Version::new(17));
    assert_eq!(collector.types().len(), 17);
}

#[tokio::test]
async fn panicking_listener_does_not_fail_the_use_case() {
    let repository = InMemorySessionRepository::new();
    let collector = Collector::default();
    let publisher = InProcessEventPublisher::new()
        .with_listener(Exploding)
        .with_listener(collector.clone());
    let service = VotingService::new(repository.clone(), Arc::new(publisher));
    let candidates = vec![CandidateId::new(), CandidateId::new()];

    let outcome = tokio::spawn(async move {
        let id = service
            .create("Lunch".to_string(), candidates.clone())
            .await?;
        service.vote(id, candidates[0], VoterId::new()).await?;
        service.close(id).await?;
        Ok::<_, ServiceError>(id)
    })
    .await;

    let id = outcome.expect("use case task panicked").unwrap();
    let stored = repository.find(id).await.unwrap();
    assert_eq!(stored.status(), VotingStatus::Closed);
    assert_eq!(collector.types(), vec!["Created", "Voted", "Closed"]);
}
