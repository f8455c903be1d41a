//! Snapshot pipeline: check servers, generate scripts, write them, link history.

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, SnapError};
use crate::history;
use crate::output::{Layout, RenderedScript};
use crate::script::{Emitter, LinkedWindows, Script};
use crate::tmux::{parse_sessions, TmuxClient, TmuxQuery, DEFAULT_SOCKET};

/// Options shaping the generated scripts
#[derive(Debug, Clone)]
pub struct Plan {
    pub layout: Layout,
    pub reattach: bool,
    pub reattach_wrapper: String,
}

impl From<&Config> for Plan {
    fn from(config: &Config) -> Self {
        Self {
            layout: config.layout,
            reattach: config.reattach,
            reattach_wrapper: config.reattach_wrapper.clone(),
        }
    }
}

/// Run the whole snapshot for the configured servers
pub async fn run(config: &Config) -> Result<()> {
    let servers: Vec<TmuxClient> = config
        .sockets
        .iter()
        .map(|socket| TmuxClient::new(&config.tmux_path).with_socket(socket))
        .collect();

    check_running(&servers).await?;

    let scripts = generate(&servers, &Plan::from(config)).await?;
    config.target.write(&scripts)?;
    info!(scripts = scripts.len(), "snapshot written");

    if config.link_history {
        for server in &servers {
            history::link_histfiles(server, &config.history_dir).await?;
        }
    }

    Ok(())
}

/// Fail unless every server answers `list-sessions`
pub async fn check_running<Q: TmuxQuery>(servers: &[Q]) -> Result<()> {
    for server in servers {
        if !server.is_server_running().await {
            return Err(SnapError::ServerNotRunning {
                socket: server.socket().to_string(),
            });
        }
    }
    Ok(())
}

/// Build every script for the given servers according to the plan
pub async fn generate<Q: TmuxQuery>(servers: &[Q], plan: &Plan) -> Result<Vec<RenderedScript>> {
    match plan.layout {
        Layout::Stream => {
            let mut script = Script::new();
            let mut attached = Vec::new();
            for server in servers {
                attached.extend(server_into(server, &mut script).await?);
            }
            if plan.reattach {
                reattach(&mut script, &attached, &plan.reattach_wrapper);
            }
            Ok(vec![RenderedScript {
                name: None,
                contents: script.render(),
            }])
        }
        Layout::PerSocket => {
            let mut scripts = Vec::with_capacity(servers.len());
            for server in servers {
                let mut script = Script::new();
                let attached = server_into(server, &mut script).await?;
                if plan.reattach {
                    reattach(&mut script, &attached, &plan.reattach_wrapper);
                }
                scripts.push(RenderedScript {
                    name: Some(server.socket().to_string()),
                    contents: script.render(),
                });
            }
            Ok(scripts)
        }
        Layout::PerSession => {
            let mut scripts = Vec::new();
            for server in servers {
                scripts.extend(per_session(server).await?);
            }
            Ok(scripts)
        }
    }
}

/// Append every session of `server` to `script`.
///
/// Returns `(socket, session)` for each session that had clients attached.
async fn server_into<Q: TmuxQuery>(
    server: &Q,
    script: &mut Script,
) -> Result<Vec<(String, String)>> {
    let sessions = parse_sessions(&server.list_sessions().await?)?;
    let mut emitter = Emitter::new(server).await;
    let mut linked = LinkedWindows::new();

    for session in &sessions {
        emitter.session(session, script, &mut linked).await?;
    }
    if sessions.is_empty() {
        script.bootstrap(server.socket());
    }
    debug!(socket = server.socket(), sessions = sessions.len(), "server captured");

    Ok(sessions
        .iter()
        .filter(|s| s.is_attached())
        .map(|s| (s.socket().to_string(), s.name.clone()))
        .collect())
}

/// One self-contained script per session, named after it
async fn per_session<Q: TmuxQuery>(server: &Q) -> Result<Vec<RenderedScript>> {
    let sessions = parse_sessions(&server.list_sessions().await?)?;
    let mut emitter = Emitter::new(server).await.self_contained(true);

    let mut scripts = Vec::with_capacity(sessions.len());
    for session in &sessions {
        let mut script = Script::new();
        emitter
            .session(session, &mut script, &mut LinkedWindows::new())
            .await?;
        script.attach_or_switch(&session.name);

        let name = if session.socket() == DEFAULT_SOCKET {
            session.name.clone()
        } else {
            format!("{}-{}", session.socket(), session.name)
        };
        scripts.push(RenderedScript {
            name: Some(name),
            contents: script.render(),
        });
    }
    Ok(scripts)
}

fn reattach(script: &mut Script, attached: &[(String, String)], wrapper: &str) {
    for (socket, session) in attached {
        script.reattach(wrapper, socket, session);
    }
}
