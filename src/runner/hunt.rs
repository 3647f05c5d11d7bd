//! Orchestration of generator, probes, classifier, guard, and stores.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::classify::ConsensusClassifier;
use crate::domain::{
    ClassificationResult, FoundRecord, SignalVerdict, UncertainRecord, Verdict,
};
use crate::error::{HuntError, Result};
use crate::generator::{CandidateGenerator, SearchState};
use crate::guard::{AnomalyGuard, GuardOutcome};
use crate::notify::Notifier;
use crate::pacing::PacingPolicy;
use crate::probes::ProbeSet;
use crate::store::{ResultStore, StateStore};

/// How often aggregate progress is logged.
const PROGRESS_INTERVAL: u64 = 50;

/// What one completed candidate did, consumed by the pacing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub domain: String,
    pub verdict: Verdict,

    /// Candidate was settled by the DNS pre-filter alone.
    pub prefiltered: bool,

    /// The anomaly guard fired on this candidate.
    pub anomaly: bool,
}

/// The single cooperative loop driving the search.
pub struct HuntRunner {
    generator: CandidateGenerator,
    probes: Arc<dyn ProbeSet>,
    classifier: ConsensusClassifier,
    guard: AnomalyGuard,
    pacing: PacingPolicy,
    state_store: StateStore,
    results: ResultStore,
    notifier: Notifier,
    state: SearchState,
    shutdown: Arc<AtomicBool>,
}

impl HuntRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        generator: CandidateGenerator,
        probes: Arc<dyn ProbeSet>,
        classifier: ConsensusClassifier,
        guard: AnomalyGuard,
        pacing: PacingPolicy,
        state_store: StateStore,
        results: ResultStore,
        notifier: Notifier,
    ) -> Result<Self> {
        let state = state_store.load()?;
        Ok(Self {
            generator,
            probes,
            classifier,
            guard,
            pacing,
            state_store,
            results,
            notifier,
            state,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag polled between candidates; setting it stops the loop after
    /// the in-flight candidate commits.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    /// Run until the shutdown flag is set. Only persistence failures
    /// escape; probe outages retry the same candidate after a pause.
    pub async fn run(&mut self) -> Result<()> {
        log::info!(
            "hunt starting at length {} tld #{} ({} checked so far, {} found)",
            self.state.current_length,
            self.state.current_tld_index,
            self.state.total_checked,
            self.results.found().len()
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.step().await {
                Ok(outcome) => {
                    let found = outcome.verdict == Verdict::Available;
                    let delay = self.pacing.pause(found, outcome.anomaly);
                    tokio::time::sleep(delay).await;
                }
                Err(HuntError::AllSourcesDown(domain)) => {
                    // cursor was not advanced; retry the same candidate
                    log::warn!("no signal source reachable for {}, retrying later", domain);
                    tokio::time::sleep(self.pacing.pause(false, true)).await;
                }
                Err(e) => return Err(e),
            }
        }

        log::info!("hunt stopped at {} checked", self.state.total_checked);
        Ok(())
    }

    /// Process exactly one candidate: generate, probe, classify, guard,
    /// commit, checkpoint. The cursor advances only when the candidate
    /// completed; a probe outage leaves it in place.
    pub async fn step(&mut self) -> Result<StepOutcome> {
        let (candidate, advanced) = self.generator.next(&self.state);

        // fast pre-filter: a resolving name is settled without burning
        // WHOIS or registrar quota on it
        if self.probes.dns_resolves(&candidate.name).await {
            log::debug!("{} resolves, pre-filtered as taken", candidate.name);
            return self.commit(
                advanced,
                StepOutcome {
                    domain: candidate.name,
                    verdict: Verdict::Taken,
                    prefiltered: true,
                    anomaly: false,
                },
            );
        }

        let readings = self.probes.collect(&candidate.name).await?;
        let result = self
            .classifier
            .classify(&candidate, readings, self.probes.as_ref())
            .await;

        let outcome = match result.verdict {
            Verdict::Taken => {
                log::debug!("{} taken", candidate.name);
                StepOutcome {
                    domain: candidate.name.clone(),
                    verdict: Verdict::Taken,
                    prefiltered: false,
                    anomaly: false,
                }
            }
            Verdict::Uncertain => {
                log::info!("{} uncertain, parked for review", candidate.name);
                self.results
                    .record_uncertain(UncertainRecord::from_result(&result))?;
                StepOutcome {
                    domain: candidate.name.clone(),
                    verdict: Verdict::Uncertain,
                    prefiltered: false,
                    anomaly: false,
                }
            }
            Verdict::Available => self.commit_available(result).await?,
        };

        self.commit(advanced, outcome)
    }

    /// Record an Available result, routing it through the anomaly guard
    /// first. Clustered finds are re-verified on the spot; failures are
    /// demoted to uncertain, never dropped.
    async fn commit_available(&mut self, result: ClassificationResult) -> Result<StepOutcome> {
        let domain = result.candidate.name.clone();

        match self.guard.observe(&domain, result.classified_at) {
            GuardOutcome::Clear => {
                log::info!("FOUND available: {}", domain);
                self.results.record_found(FoundRecord::from_result(&result))?;
                self.notifier.notify(&result).await;
                Ok(StepOutcome {
                    domain,
                    verdict: Verdict::Available,
                    prefiltered: false,
                    anomaly: false,
                })
            }
            GuardOutcome::Flagged { domains } => {
                let mut current_survived = false;
                for flagged in &domains {
                    let survived = self.reverify_flagged(flagged).await?;
                    if flagged == &domain {
                        current_survived = survived;
                    }
                }

                let verdict = if current_survived {
                    log::info!("FOUND available (survived anomaly re-check): {}", domain);
                    self.results.record_found(FoundRecord::from_result(&result))?;
                    self.notifier.notify(&result).await;
                    Verdict::Available
                } else {
                    self.results
                        .record_uncertain(UncertainRecord::from_result(&result))?;
                    Verdict::Uncertain
                };

                Ok(StepOutcome {
                    domain,
                    verdict,
                    prefiltered: false,
                    anomaly: true,
                })
            }
        }
    }

    /// Re-run the WHOIS check for a domain the guard flagged. Returns
    /// whether the domain still looks available; an already-committed
    /// find that fails is moved to the uncertain sink.
    async fn reverify_flagged(&mut self, domain: &str) -> Result<bool> {
        let recheck = self.probes.recheck_whois(domain).await;
        if recheck.verdict == SignalVerdict::Taken {
            log::warn!("{} failed anomaly re-verification", domain);
            self.guard.forget(domain);
            self.results.demote(domain)?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Advance and checkpoint the cursor. Nothing else may run between a
    /// candidate completing and its checkpoint landing on disk.
    fn commit(&mut self, advanced: SearchState, outcome: StepOutcome) -> Result<StepOutcome> {
        self.state = advanced;
        self.state_store.save(&self.state)?;

        if self.state.total_checked % PROGRESS_INTERVAL == 0 {
            log::info!(
                "progress: {} | checked: {} | found: {} | uncertain: {}",
                outcome.domain,
                self.state.total_checked,
                self.results.found().len(),
                self.results.uncertain().len()
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SignalReading, SignalSource};
    use crate::probes::ProbeSet;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Scripted probe set: per-domain readings, everything else defaults
    /// to a taken-looking WHOIS record. Re-check verdicts are consumed
    /// from a per-domain queue (classification re-check first, anomaly
    /// re-checks after), defaulting to Available when the queue is empty.
    struct ScriptedProbes {
        scripts: Mutex<HashMap<String, Vec<SignalReading>>>,
        rechecks: Mutex<HashMap<String, Vec<SignalVerdict>>>,
    }

    impl ScriptedProbes {
        fn new() -> Self {
            Self {
                scripts: Mutex::new(HashMap::new()),
                rechecks: Mutex::new(HashMap::new()),
            }
        }

        fn script_available(&self, domain: &str) {
            self.scripts.lock().unwrap().insert(
                domain.to_string(),
                vec![
                    SignalReading::new(SignalSource::Whois, SignalVerdict::Available, ""),
                    SignalReading::new(SignalSource::GoDaddy, SignalVerdict::Available, ""),
                    SignalReading::new(SignalSource::Namecheap, SignalVerdict::Available, ""),
                ],
            );
        }

        fn queue_recheck(&self, domain: &str, verdict: SignalVerdict) {
            self.rechecks
                .lock()
                .unwrap()
                .entry(domain.to_string())
                .or_default()
                .push(verdict);
        }
    }

    #[async_trait]
    impl ProbeSet for ScriptedProbes {
        async fn dns_resolves(&self, _domain: &str) -> bool {
            false
        }

        async fn collect(&self, domain: &str) -> Result<Vec<SignalReading>> {
            Ok(self
                .scripts
                .lock()
                .unwrap()
                .get(domain)
                .cloned()
                .unwrap_or_else(|| {
                    vec![SignalReading::new(
                        SignalSource::Whois,
                        SignalVerdict::Taken,
                        "registrar: example",
                    )]
                }))
        }

        async fn recheck_whois(&self, domain: &str) -> SignalReading {
            let mut rechecks = self.rechecks.lock().unwrap();
            let verdict = match rechecks.get_mut(domain) {
                Some(queue) if !queue.is_empty() => queue.remove(0),
                _ => SignalVerdict::Available,
            };
            SignalReading::new(SignalSource::Whois, verdict, "")
        }
    }

    fn runner_in(dir: &TempDir, probes: Arc<dyn ProbeSet>) -> HuntRunner {
        HuntRunner::new(
            CandidateGenerator::new(vec!["io".to_string()]),
            probes,
            ConsensusClassifier::new(Duration::ZERO),
            AnomalyGuard::default(),
            PacingPolicy::instant(),
            StateStore::new(dir.path().join("hunter_state.json")),
            ResultStore::open(
                dir.path().join("found_domains.json"),
                dir.path().join("uncertain_domains.json"),
            )
            .unwrap(),
            Notifier::new(
                reqwest::Client::new(),
                &crate::config::NotifyConfig {
                    webhook_url: None,
                    min_notify_length: 4,
                },
            ),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_step_advances_and_checkpoints() {
        let dir = TempDir::new().unwrap();
        let probes = Arc::new(ScriptedProbes::new());
        let mut runner = runner_in(&dir, probes);

        let outcome = runner.step().await.unwrap();
        assert_eq!(outcome.domain, "aaa.io");
        assert_eq!(outcome.verdict, Verdict::Taken);
        assert_eq!(runner.state().total_checked, 1);

        // checkpoint is durable and points at the next candidate
        let reloaded = StateStore::new(dir.path().join("hunter_state.json"))
            .load()
            .unwrap();
        assert_eq!(reloaded.current_candidate_index, 1);
    }

    #[tokio::test]
    async fn test_available_candidate_recorded_and_reverified() {
        let dir = TempDir::new().unwrap();
        let probes = Arc::new(ScriptedProbes::new());
        probes.script_available("aaa.io");
        let mut runner = runner_in(&dir, probes);

        let outcome = runner.step().await.unwrap();
        assert_eq!(outcome.verdict, Verdict::Available);
        assert!(!outcome.anomaly);
        assert_eq!(runner.results().found().len(), 1);
        assert_eq!(runner.results().found()[0].domain, "aaa.io");
    }

    #[tokio::test]
    async fn test_clustered_finds_demoted_when_recheck_fails() {
        let dir = TempDir::new().unwrap();
        let probes = Arc::new(ScriptedProbes::new());
        probes.script_available("aaa.io");
        probes.script_available("aab.io");
        let mut runner = runner_in(&dir, probes.clone());

        // first find lands clean
        let first = runner.step().await.unwrap();
        assert_eq!(first.verdict, Verdict::Available);

        // second find clusters: its classification re-check stays clean,
        // but the upstream then goes bad and both anomaly re-checks fail
        probes.queue_recheck("aab.io", SignalVerdict::Available);
        probes.queue_recheck("aaa.io", SignalVerdict::Taken);
        probes.queue_recheck("aab.io", SignalVerdict::Taken);
        let second = runner.step().await.unwrap();

        assert!(second.anomaly);
        assert_eq!(second.verdict, Verdict::Uncertain);
        // the earlier find was demoted, the current one parked
        assert!(runner.results().found().is_empty());
        let uncertain: Vec<_> = runner
            .results()
            .uncertain()
            .iter()
            .map(|r| r.domain.clone())
            .collect();
        assert!(uncertain.contains(&"aaa.io".to_string()));
        assert!(uncertain.contains(&"aab.io".to_string()));
    }

    #[tokio::test]
    async fn test_clustered_finds_survive_when_recheck_clean() {
        let dir = TempDir::new().unwrap();
        let probes = Arc::new(ScriptedProbes::new());
        probes.script_available("aaa.io");
        probes.script_available("aab.io");
        let mut runner = runner_in(&dir, probes);

        runner.step().await.unwrap();
        let second = runner.step().await.unwrap();

        // guard fired but rechecks stayed clean: both finds stand
        assert!(second.anomaly);
        assert_eq!(second.verdict, Verdict::Available);
        assert_eq!(runner.results().found().len(), 2);
    }

    #[tokio::test]
    async fn test_resume_continues_at_next_candidate() {
        let dir = TempDir::new().unwrap();

        let first = {
            let mut runner = runner_in(&dir, Arc::new(ScriptedProbes::new()));
            runner.step().await.unwrap().domain
        };
        assert_eq!(first, "aaa.io");

        // a fresh runner over the same data dir picks up where we stopped
        let mut resumed = runner_in(&dir, Arc::new(ScriptedProbes::new()));
        assert_eq!(resumed.step().await.unwrap().domain, "aab.io");
        assert_eq!(resumed.state().total_checked, 2);
    }

    #[tokio::test]
    async fn test_probe_outage_leaves_cursor_unadvanced() {
        struct DownProbes;

        #[async_trait]
        impl ProbeSet for DownProbes {
            async fn dns_resolves(&self, _domain: &str) -> bool {
                false
            }
            async fn collect(&self, domain: &str) -> Result<Vec<SignalReading>> {
                Err(HuntError::AllSourcesDown(domain.to_string()))
            }
            async fn recheck_whois(&self, _domain: &str) -> SignalReading {
                SignalReading::new(SignalSource::Whois, SignalVerdict::Inconclusive, "")
            }
        }

        let dir = TempDir::new().unwrap();
        let mut runner = runner_in(&dir, Arc::new(DownProbes));

        let err = runner.step().await.unwrap_err();
        assert!(matches!(err, HuntError::AllSourcesDown(_)));
        assert_eq!(runner.state().total_checked, 0);

        // same candidate comes up again on the next step
        let mut retry = runner_in(&dir, Arc::new(ScriptedProbes::new()));
        assert_eq!(retry.step().await.unwrap().domain, "aaa.io");
    }

    #[tokio::test]
    async fn test_shutdown_flag_stops_run() {
        let dir = TempDir::new().unwrap();
        let mut runner = runner_in(&dir, Arc::new(ScriptedProbes::new()));
        runner.shutdown_flag().store(true, Ordering::Relaxed);
        runner.run().await.unwrap();
        assert_eq!(runner.state().total_checked, 0);
    }
}
