//! App Service - main application orchestrator.
//!
//! This service coordinates the reconciliation workflow for one app:
//! 1. Read the observed state from the host
//! 2. Plan the commands with the reconciler
//! 3. Run them in order, stopping at the first failure
//! 4. Read the app back and produce a fresh record
//!
//! It implements the driving port (incoming) and uses the remote command
//! port (outgoing).

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{ApplicationError, RemoteError, ports::RemoteCommandClient},
    domain::{
        AppName, AppRecord, DokkuApp, DokkuCommand, DomainValidator as validator, Plan,
        Reconciler, parsers,
    },
    error::DokkuformResult,
};

/// Result of applying a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// The plan that was executed.
    pub plan: Plan,
    /// The app as read back afterwards, restricted to declared config keys.
    pub app: DokkuApp,
    /// Record to persist for the next run.
    pub record: AppRecord,
}

/// Reconciles declared apps against a Dokku host.
pub struct AppService {
    client: Box<dyn RemoteCommandClient>,
}

impl AppService {
    /// Create a new app service on top of a remote command client.
    pub fn new(client: Box<dyn RemoteCommandClient>) -> Self {
        Self { client }
    }

    /// Read the current state of `name` from the host.
    ///
    /// Returns `None` when the host says the app does not exist.
    #[instrument(skip(self), fields(app = %name))]
    pub fn retrieve(&self, name: &AppName) -> DokkuformResult<Option<DokkuApp>> {
        match self.run(&DokkuCommand::AppsExists { app: name.clone() }) {
            Ok(_) => {}
            Err(e) if e.is_missing_app() => {
                debug!("app does not exist");
                return Ok(None);
            }
            Err(e) => return Err(ApplicationError::Remote(e).into()),
        }

        let config_output = self
            .run(&DokkuCommand::ConfigShow { app: name.clone() })
            .map_err(ApplicationError::Remote)?;
        let config_vars = parsers::parse_config_show(&config_output)?;

        let domains_output = self
            .run(&DokkuCommand::DomainsReport { app: name.clone() })
            .map_err(ApplicationError::Remote)?;
        let domains = parsers::parse_domains_report(&domains_output)?;

        let locked = self.is_locked(name)?;

        Ok(Some(
            DokkuApp::new(name.clone())
                .with_locked(locked)
                .with_config_vars(config_vars)
                .with_domains(domains),
        ))
    }

    /// Plan the commands needed to converge `desired`.
    ///
    /// When a prior record exists the app is looked up under its recorded
    /// name, so a name change in the manifest becomes a rename.
    #[instrument(skip_all, fields(app = %desired.name))]
    pub fn plan(&self, desired: &DokkuApp, prior: Option<&AppRecord>) -> DokkuformResult<Plan> {
        validator::validate_app(desired)?;

        let observed = self.observe(desired, prior)?;
        let plan = Reconciler::plan(desired, prior, observed.as_ref());

        info!(action = %plan.action(), commands = plan.len(), "Plan computed");
        Ok(plan)
    }

    /// Converge `desired` and return what the host looks like afterwards.
    pub fn apply(&self, desired: &DokkuApp, prior: Option<&AppRecord>) -> DokkuformResult<ApplyOutcome> {
        self.apply_with(desired, prior, |_, _| {})
    }

    /// Like [`Self::apply`], calling `on_step` before each command runs.
    #[instrument(skip_all, fields(app = %desired.name))]
    pub fn apply_with<F>(
        &self,
        desired: &DokkuApp,
        prior: Option<&AppRecord>,
        on_step: F,
    ) -> DokkuformResult<ApplyOutcome>
    where
        F: FnMut(usize, &DokkuCommand),
    {
        let plan = self.plan(desired, prior)?;
        self.apply_plan(desired, plan, on_step)
    }

    /// Run a plan computed earlier for `desired` and read the app back.
    ///
    /// Used when the plan was shown to the user before being confirmed.
    #[instrument(skip_all, fields(app = %desired.name, action = %plan.action()))]
    pub fn apply_plan<F>(&self, desired: &DokkuApp, plan: Plan, on_step: F) -> DokkuformResult<ApplyOutcome>
    where
        F: FnMut(usize, &DokkuCommand),
    {
        self.execute(&plan, on_step)?;
        self.read_back(desired, plan)
    }

    /// Create `desired` on the host without looking at what is there.
    #[instrument(skip_all, fields(app = %desired.name))]
    pub fn create(&self, desired: &DokkuApp) -> DokkuformResult<ApplyOutcome> {
        validator::validate_app(desired)?;

        let plan = Reconciler::create(desired);
        self.execute(&plan, |_, _| {})?;
        self.read_back(desired, plan)
    }

    /// Converge an app that must already exist.
    #[instrument(skip_all, fields(app = %desired.name))]
    pub fn update(&self, desired: &DokkuApp, prior: Option<&AppRecord>) -> DokkuformResult<ApplyOutcome> {
        validator::validate_app(desired)?;

        let Some(observed) = self.observe(desired, prior)? else {
            return Err(ApplicationError::AppNotFound {
                name: desired.name.to_string(),
            }
            .into());
        };

        let plan = Reconciler::update(desired, prior, &observed);
        self.execute(&plan, |_, _| {})?;
        self.read_back(desired, plan)
    }

    /// Plan the removal of `name`. A missing app yields a no-op plan.
    #[instrument(skip(self), fields(app = %name))]
    pub fn plan_destroy(&self, name: &AppName) -> DokkuformResult<Plan> {
        if self.retrieve(name)?.is_none() {
            info!("App already absent");
            return Ok(Plan::noop(name.clone()));
        }
        Ok(Reconciler::delete(name))
    }

    /// Destroy `name` on the host. A missing app yields a no-op plan.
    pub fn destroy(&self, name: &AppName) -> DokkuformResult<Plan> {
        let plan = self.plan_destroy(name)?;
        self.execute(&plan, |_, _| {})?;
        if !plan.is_noop() {
            info!(app = %name, "App destroyed");
        }
        Ok(plan)
    }

    /// Run every command of `plan` in order.
    ///
    /// Stops at the first failure; commands already run are not undone.
    pub fn execute<F>(&self, plan: &Plan, mut on_step: F) -> DokkuformResult<()>
    where
        F: FnMut(usize, &DokkuCommand),
    {
        let total = plan.len();

        for (idx, command) in plan.commands().iter().enumerate() {
            on_step(idx, command);
            self.run(command).map_err(|source| {
                warn!(step = idx + 1, total, command = %command, "Apply interrupted");
                ApplicationError::ApplyInterrupted {
                    app: plan.app().to_string(),
                    command: command.render(),
                    step: idx + 1,
                    total,
                    source,
                }
            })?;
        }

        if total > 0 {
            info!(commands = total, "Plan executed");
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Find the app on the host, under its recorded name first.
    fn observe(&self, desired: &DokkuApp, prior: Option<&AppRecord>) -> DokkuformResult<Option<DokkuApp>> {
        if let Some(prior) = prior.filter(|p| p.name != desired.name) {
            if let Some(found) = self.retrieve(&prior.name)? {
                return Ok(Some(found));
            }
            debug!(recorded = %prior.name, "Recorded name not found, trying declared name");
        }
        self.retrieve(&desired.name)
    }

    fn read_back(&self, desired: &DokkuApp, plan: Plan) -> DokkuformResult<ApplyOutcome> {
        let observed = self
            .retrieve(&desired.name)?
            .ok_or_else(|| ApplicationError::AppNotFound {
                name: desired.name.to_string(),
            })?;

        let app = observed.managed_view(desired.config_vars.keys());
        let record = AppRecord::from_applied(&app, Utc::now());

        Ok(ApplyOutcome { plan, app, record })
    }

    fn is_locked(&self, name: &AppName) -> DokkuformResult<bool> {
        match self.run(&DokkuCommand::AppsLocked { app: name.clone() }) {
            Ok(_) => Ok(true),
            Err(RemoteError::NonZeroExit { .. }) => Ok(false),
            Err(e) => Err(ApplicationError::Remote(e).into()),
        }
    }

    fn run(&self, command: &DokkuCommand) -> Result<String, RemoteError> {
        let line = command.render();
        debug!(command = %line, "Running remote command");

        let result = self.client.run(&line);
        match &result {
            Ok(output) => debug!(command = %line, output = %output, "Remote command succeeded"),
            Err(e) => debug!(command = %line, error = %e, "Remote command failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::{
        application::{APP_MISSING_EXIT_STATUS, ports::MockRemoteCommandClient},
        domain::{DomainError, PlanAction},
        error::DokkuformError,
    };

    const CONFIG: &str = "=====> web env vars\nA: 1\nDOKKU_PROXY_PORT: 80\n";
    const DOMAINS: &str = "=====> web domains information\n       Domains app vhosts:   a.io\n";

    fn name(s: &str) -> AppName {
        AppName::new(s).unwrap()
    }

    fn exit(command: &str, status: i32) -> RemoteError {
        RemoteError::NonZeroExit {
            command: command.into(),
            status,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn expect_existing_web(mock: &mut MockRemoteCommandClient) {
        mock.expect_run()
            .with(eq("apps:exists web"))
            .returning(|_| Ok(String::new()));
        mock.expect_run()
            .with(eq("config:show web"))
            .returning(|_| Ok(CONFIG.into()));
        mock.expect_run()
            .with(eq("domains:report web"))
            .returning(|_| Ok(DOMAINS.into()));
        mock.expect_run()
            .with(eq("apps:locked web"))
            .returning(|c| Err(exit(c, 1)));
    }

    #[test]
    fn retrieve_missing_app_is_none() {
        let mut mock = MockRemoteCommandClient::new();
        mock.expect_run()
            .with(eq("apps:exists web"))
            .times(1)
            .returning(|c| Err(exit(c, APP_MISSING_EXIT_STATUS)));

        let service = AppService::new(Box::new(mock));
        assert_eq!(service.retrieve(&name("web")).unwrap(), None);
    }

    #[test]
    fn retrieve_reads_config_domains_and_lock() {
        let mut mock = MockRemoteCommandClient::new();
        expect_existing_web(&mut mock);

        let service = AppService::new(Box::new(mock));
        let app = service.retrieve(&name("web")).unwrap().unwrap();

        assert_eq!(app.config_vars.get("A"), Some("1"));
        assert_eq!(app.config_vars.get("DOKKU_PROXY_PORT"), Some("80"));
        assert!(app.domains.contains("a.io"));
        assert!(!app.locked);
    }

    #[test]
    fn retrieve_propagates_connection_errors() {
        let mut mock = MockRemoteCommandClient::new();
        mock.expect_run().returning(|_| {
            Err(RemoteError::Connect {
                reason: "connection refused".into(),
            })
        });

        let service = AppService::new(Box::new(mock));
        let err = service.retrieve(&name("web")).unwrap_err();

        assert!(matches!(
            err,
            DokkuformError::Application(ApplicationError::Remote(RemoteError::Connect { .. }))
        ));
    }

    #[test]
    fn retrieve_surfaces_parse_errors() {
        let mut mock = MockRemoteCommandClient::new();
        mock.expect_run()
            .with(eq("apps:exists web"))
            .returning(|_| Ok(String::new()));
        mock.expect_run()
            .with(eq("config:show web"))
            .returning(|_| Ok("garbage\n".into()));

        let service = AppService::new(Box::new(mock));
        assert!(matches!(
            service.retrieve(&name("web")),
            Err(DokkuformError::Domain(DomainError::MalformedOutput { .. }))
        ));
    }

    #[test]
    fn plan_for_missing_app_creates() {
        let mut mock = MockRemoteCommandClient::new();
        mock.expect_run()
            .with(eq("apps:exists web"))
            .returning(|c| Err(exit(c, APP_MISSING_EXIT_STATUS)));

        let service = AppService::new(Box::new(mock));
        let plan = service.plan(&DokkuApp::new(name("web")), None).unwrap();

        assert_eq!(plan.action(), PlanAction::Create);
    }

    #[test]
    fn plan_rejects_invalid_declared_state_before_any_command() {
        let mock = MockRemoteCommandClient::new();
        let service = AppService::new(Box::new(mock));

        let desired = DokkuApp::new(name("web")).with_config_var("BAD-KEY", "x");
        assert!(matches!(
            service.plan(&desired, None),
            Err(DokkuformError::Domain(DomainError::InvalidConfigKey { .. }))
        ));
    }

    #[test]
    fn plan_matching_app_is_noop() {
        let mut mock = MockRemoteCommandClient::new();
        expect_existing_web(&mut mock);

        let service = AppService::new(Box::new(mock));
        let desired = DokkuApp::new(name("web")).with_config_var("A", "1").with_domain("a.io");

        assert!(service.plan(&desired, None).unwrap().is_noop());
    }

    #[test]
    fn execute_stops_at_first_failure() {
        let mut mock = MockRemoteCommandClient::new();
        mock.expect_run()
            .with(eq("apps:create web"))
            .times(1)
            .returning(|_| Ok(String::new()));
        mock.expect_run()
            .with(eq("config:set web A=1"))
            .times(1)
            .returning(|c| Err(exit(c, 1)));
        mock.expect_run().with(eq("domains:clear web")).times(0);

        let service = AppService::new(Box::new(mock));
        let plan = Reconciler::create(&DokkuApp::new(name("web")).with_config_var("A", "1"));

        let mut seen = Vec::new();
        let err = service
            .execute(&plan, |idx, _| seen.push(idx))
            .unwrap_err();

        assert_eq!(seen, vec![0, 1]);
        assert!(matches!(
            err,
            DokkuformError::Application(ApplicationError::ApplyInterrupted { step: 2, total: 3, .. })
        ));
    }

    #[test]
    fn destroy_missing_app_is_noop() {
        let mut mock = MockRemoteCommandClient::new();
        mock.expect_run()
            .with(eq("apps:exists web"))
            .returning(|c| Err(exit(c, APP_MISSING_EXIT_STATUS)));
        mock.expect_run().with(eq("apps:destroy web --force")).times(0);

        let service = AppService::new(Box::new(mock));
        assert!(service.destroy(&name("web")).unwrap().is_noop());
    }

    #[test]
    fn update_requires_existing_app() {
        let mut mock = MockRemoteCommandClient::new();
        mock.expect_run()
            .with(eq("apps:exists web"))
            .returning(|c| Err(exit(c, APP_MISSING_EXIT_STATUS)));

        let service = AppService::new(Box::new(mock));
        assert!(matches!(
            service.update(&DokkuApp::new(name("web")), None),
            Err(DokkuformError::Application(ApplicationError::AppNotFound { .. }))
        ));
    }

    #[test]
    fn plan_destroy_does_not_run_the_deletion() {
        let mut mock = MockRemoteCommandClient::new();
        expect_existing_web(&mut mock);
        mock.expect_run().with(eq("apps:destroy web --force")).times(0);

        let service = AppService::new(Box::new(mock));
        let plan = service.plan_destroy(&name("web")).unwrap();

        assert_eq!(plan.action(), PlanAction::Delete);
        assert_eq!(plan.commands()[0].render(), "apps:destroy web --force");
    }
}
