//! In-memory Dokku host for testing.
//!
//! Interprets the same command lines a real host receives and answers in
//! Dokku's textual format, so the parsers and the reconciler are exercised
//! end to end without a network.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, RwLock},
};

use dokkuform_core::{
    application::{APP_MISSING_EXIT_STATUS, RemoteError, ports::RemoteCommandClient},
    domain::{AppName, ConfigVars, DokkuApp, Domains},
};

/// Fake Dokku host.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDokku {
    inner: Arc<RwLock<InMemoryDokkuInner>>,
}

#[derive(Debug, Default)]
struct InMemoryDokkuInner {
    apps: BTreeMap<String, FakeApp>,
    global_vhost: Option<String>,
    history: Vec<String>,
    failures: Vec<(String, i32)>,
}

#[derive(Debug, Default, Clone)]
struct FakeApp {
    locked: bool,
    config: BTreeMap<String, String>,
    domains: BTreeSet<String>,
}

type Reply = Result<String, (i32, String)>;

impl InMemoryDokku {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// New apps get `<app>.<domain>` as their default vhost.
    pub fn with_global_vhost(self, domain: impl Into<String>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.global_vhost = Some(domain.into());
        }
        self
    }

    /// Seed an existing app.
    pub fn with_app(self, app: &DokkuApp) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.apps.insert(
                app.name.to_string(),
                FakeApp {
                    locked: app.locked,
                    config: app
                        .config_vars
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    domains: app.domains.iter().map(str::to_string).collect(),
                },
            );
        }
        self
    }

    /// Make every command starting with `prefix` exit with `status`.
    pub fn fail_on(&self, prefix: impl Into<String>, status: i32) {
        if let Ok(mut inner) = self.inner.write() {
            inner.failures.push((prefix.into(), status));
        }
    }

    /// Snapshot of an app as the host sees it (testing helper).
    pub fn app(&self, name: &str) -> Option<DokkuApp> {
        let inner = self.inner.read().ok()?;
        let fake = inner.apps.get(name)?;
        let app_name = AppName::new(name).ok()?;

        Some(
            DokkuApp::new(app_name)
                .with_locked(fake.locked)
                .with_config_vars(fake.config.clone().into())
                .with_domains(fake.domains.iter().cloned().collect::<Domains>()),
        )
    }

    /// Every command line received, in order.
    pub fn history(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.history.clone())
            .unwrap_or_default()
    }

    /// Commands received that change state.
    pub fn mutations(&self) -> Vec<String> {
        const READS: [&str; 4] = ["apps:exists", "apps:locked", "config:show", "domains:report"];
        self.history()
            .into_iter()
            .filter(|line| !READS.iter().any(|r| line.starts_with(r)))
            .collect()
    }

    pub fn clear_history(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.history.clear();
        }
    }
}

impl RemoteCommandClient for InMemoryDokku {
    fn run(&self, command: &str) -> Result<String, RemoteError> {
        let mut inner = self.inner.write().map_err(|_| RemoteError::Connect {
            reason: "fake host lock poisoned".into(),
        })?;
        inner.history.push(command.to_string());

        let injected = inner
            .failures
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, status)| *status);

        let reply = match injected {
            Some(status) => Err((status, format!(" !     injected failure for '{command}'"))),
            None => match split_words(command) {
                Ok(words) => inner.dispatch(&words),
                Err(reason) => Err((1, format!(" !     {reason}"))),
            },
        };

        reply.map_err(|(status, stderr)| RemoteError::NonZeroExit {
            command: command.to_string(),
            status,
            stdout: String::new(),
            stderr: format!("{stderr}\n"),
        })
    }
}

impl InMemoryDokkuInner {
    fn dispatch(&mut self, words: &[String]) -> Reply {
        let Some((verb, args)) = words.split_first() else {
            return Err((1, " !     no command given".into()));
        };

        match verb.as_str() {
            "apps:exists" => self.app_ref(args).map(|_| String::new()),
            "apps:create" => self.create(args),
            "apps:rename" => self.rename(args),
            "apps:destroy" => self.destroy(args),
            "apps:lock" => self.app_mut(args).map(|app| {
                app.locked = true;
                "-----> Deploy lock created\n".to_string()
            }),
            "apps:unlock" => self.app_mut(args).map(|app| {
                app.locked = false;
                "-----> Deploy lock removed\n".to_string()
            }),
            "apps:locked" => {
                let app = self.app_ref(args)?;
                if app.locked {
                    Ok("Deploy lock exists\n".into())
                } else {
                    Err((1, "Deploy lock does not exist".into()))
                }
            }
            "config:show" => self.config_show(args),
            "config:set" => self.config_set(args),
            "config:unset" => self.config_unset(args),
            "domains:report" => self.domains_report(args),
            "domains:set" => self.app_mut(args).map(|app| {
                app.domains = args[1..].iter().cloned().collect();
                String::new()
            }),
            "domains:add" => self.app_mut(args).map(|app| {
                app.domains.extend(args[1..].iter().cloned());
                String::new()
            }),
            "domains:remove" => self.app_mut(args).map(|app| {
                for domain in &args[1..] {
                    app.domains.remove(domain);
                }
                String::new()
            }),
            "domains:clear" => self.app_mut(args).map(|app| {
                app.domains.clear();
                String::new()
            }),
            other => Err((1, format!(" !     `{other}` is not a dokku command."))),
        }
    }

    fn app_ref(&self, args: &[String]) -> Result<&FakeApp, (i32, String)> {
        let name = first_arg(args)?;
        self.apps.get(name).ok_or_else(|| missing(name))
    }

    fn app_mut(&mut self, args: &[String]) -> Result<&mut FakeApp, (i32, String)> {
        let name = first_arg(args)?;
        self.apps.get_mut(name).ok_or_else(|| missing(name))
    }

    fn create(&mut self, args: &[String]) -> Reply {
        let name = first_arg(args)?;
        if self.apps.contains_key(name) {
            return Err((1, " !     Name is already taken".into()));
        }

        let mut app = FakeApp::default();
        if let Some(global) = &self.global_vhost {
            app.domains.insert(format!("{name}.{global}"));
        }
        self.apps.insert(name.to_string(), app);
        Ok(format!("-----> Creating {name}...\n"))
    }

    fn rename(&mut self, args: &[String]) -> Reply {
        let [from, to] = args else {
            return Err((1, " !     Please specify an old and new app name".into()));
        };
        if self.apps.contains_key(to) {
            return Err((1, format!(" !     New app name {to} already in use")));
        }
        let app = self.apps.remove(from).ok_or_else(|| missing(from))?;
        self.apps.insert(to.clone(), app);
        Ok(format!("-----> Renaming {from} to {to}\n"))
    }

    fn destroy(&mut self, args: &[String]) -> Reply {
        let name = first_arg(args)?;
        if !args.iter().any(|a| a == "--force") {
            return Err((1, " !     Confirmation required; pass --force".into()));
        }
        self.apps.remove(name).ok_or_else(|| missing(name))?;
        Ok(format!("-----> Destroying {name} (including all add-ons)\n"))
    }

    fn config_show(&self, args: &[String]) -> Reply {
        let name = first_arg(args)?;
        let app = self.app_ref(args)?;

        let width = app.config.keys().map(String::len).max().unwrap_or(0) + 1;
        let mut out = format!("=====> {name} env vars\n");
        for (key, value) in &app.config {
            out.push_str(&format!("{:<width$} {value}\n", format!("{key}:")));
        }
        Ok(out)
    }

    fn config_set(&mut self, args: &[String]) -> Reply {
        let app = self.app_mut(args)?;
        let mut pairs = Vec::new();
        for assignment in &args[1..] {
            let Some((key, value)) = assignment.split_once('=') else {
                return Err((1, format!(" !     Invalid env pair: {assignment}")));
            };
            pairs.push((key.to_string(), value.to_string()));
        }
        app.config.extend(pairs);
        Ok("-----> Setting config vars\n".into())
    }

    fn config_unset(&mut self, args: &[String]) -> Reply {
        let app = self.app_mut(args)?;
        for key in &args[1..] {
            app.config.remove(key);
        }
        Ok("-----> Unsetting config vars\n".into())
    }

    fn domains_report(&self, args: &[String]) -> Reply {
        let name = first_arg(args)?;
        let app = self.app_ref(args)?;
        let vhosts = app.domains.iter().cloned().collect::<Vec<_>>().join(" ");
        let global = self.global_vhost.clone().unwrap_or_default();

        Ok(format!(
            "=====> {name} domains information\n\
             \x20      Domains app enabled:           {}\n\
             \x20      Domains app vhosts:            {vhosts}\n\
             \x20      Domains global enabled:        {}\n\
             \x20      Domains global vhosts:         {global}\n",
            !app.domains.is_empty(),
            !global.is_empty(),
        ))
    }
}

fn first_arg(args: &[String]) -> Result<&str, (i32, String)> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| (1, " !     Please specify an app to run the command on".into()))
}

fn missing(name: &str) -> (i32, String) {
    (APP_MISSING_EXIT_STATUS, format!(" !     App {name} does not exist"))
}

/// Split a command line the way a POSIX shell would, for the subset of
/// quoting `DokkuCommand::render` produces.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(q) => current.push(q),
                        None => return Err("unterminated quote".into()),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => return Err("trailing backslash".into()),
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}
