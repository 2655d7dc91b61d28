//! Player proxies - one task per player handle
//!
//! Level 3 - Step-level implementation
//!
//! Each handle is moved onto its own tokio task and driven through an
//! inbox. Requests carry a reply channel the referee waits on under the
//! deadline; notifications are queued and never awaited by the referee,
//! and never cost a player its turn.

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::anyhow;
use hexfish_core::{Coord, GameError, GameState, Move};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::warn;

use crate::player::{deliver, Notification, PlayerHandle};
use crate::results::Seat;

/// Why a player was thrown out
#[derive(Debug, thiserror::Error)]
pub(crate) enum Fault {
    #[error("player error: {0:#}")]
    Failed(anyhow::Error),
    #[error("illegal action: {0}")]
    Illegal(GameError),
    #[error("no answer within {0:?}")]
    TimedOut(Duration),
}

enum Command {
    Placement(GameState, oneshot::Sender<anyhow::Result<Coord>>),
    Move(GameState, oneshot::Sender<anyhow::Result<Move>>),
    Notify(Notification),
}

/// The referee's side of a player task
pub(crate) struct PlayerProxy {
    seat: Seat,
    inbox: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
    timeout: Duration,
}

impl PlayerProxy {
    /// Move `handle` onto its own task
    pub(crate) fn spawn(seat: Seat, handle: Box<dyn PlayerHandle>, timeout: Duration) -> Self {
        let (inbox, commands) = mpsc::unbounded_channel();
        let task = tokio::spawn(serve(seat.name.clone(), handle, commands, timeout));
        Self {
            seat,
            inbox,
            task,
            timeout,
        }
    }

    pub(crate) fn seat(&self) -> &Seat {
        &self.seat
    }

    pub(crate) async fn request_placement(&self, state: GameState) -> Result<Coord, Fault> {
        let (reply, answer) = oneshot::channel();
        self.ask(Command::Placement(state, reply), answer).await
    }

    pub(crate) async fn request_move(&self, state: GameState) -> Result<Move, Fault> {
        let (reply, answer) = oneshot::channel();
        self.ask(Command::Move(state, reply), answer).await
    }

    /// Queue a notification without waiting for it
    pub(crate) fn notify(&self, notification: Notification) {
        if self.inbox.send(Command::Notify(notification)).is_err() {
            warn!(player = %self.seat.name, "player task gone, notification dropped");
        }
    }

    /// Stop the task at once; whatever it was doing is abandoned
    pub(crate) fn abort(self) {
        self.task.abort();
    }

    /// Close the inbox and let queued notifications drain until `deadline`.
    /// Without a deadline the task is awaited to completion.
    pub(crate) async fn shutdown(self, deadline: Option<Instant>) {
        let Self { seat, inbox, task, .. } = self;
        drop(inbox);
        let Some(deadline) = deadline else {
            let _ = task.await;
            return;
        };
        let abort = task.abort_handle();
        if tokio::time::timeout_at(deadline, task).await.is_err() {
            warn!(player = %seat.name, "player task still busy at shutdown");
            abort.abort();
        }
    }

    /// Send a request and wait for the reply under the deadline.
    /// The deadline runs on the referee's task, so a handle that blocks its
    /// own thread cannot hold it up.
    async fn ask<T>(&self, command: Command, answer: oneshot::Receiver<anyhow::Result<T>>) -> Result<T, Fault> {
        self.inbox
            .send(command)
            .map_err(|_| Fault::Failed(anyhow!("player task is gone")))?;
        match tokio::time::timeout(self.timeout, answer).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(err))) => Err(Fault::Failed(err)),
            Ok(Err(_)) => Err(Fault::Failed(anyhow!("player task ended without answering"))),
            Err(_) => Err(Fault::TimedOut(self.timeout)),
        }
    }
}

/// Player task body: serve commands until the inbox closes.
///
/// Notifications are delivered in order. A request takes priority: a
/// notification still in flight when one arrives is dropped along with any
/// queued behind it, since the request carries a full snapshot anyway.
async fn serve(
    name: String,
    mut handle: Box<dyn PlayerHandle>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    timeout: Duration,
) {
    let mut backlog: VecDeque<Notification> = VecDeque::new();
    let mut closed = false;
    loop {
        let Some(notification) = backlog.pop_front() else {
            match commands.recv().await {
                Some(Command::Notify(notification)) => backlog.push_back(notification),
                Some(request) => answer(handle.as_mut(), request).await,
                None => return,
            }
            continue;
        };

        let interrupted = {
            let delivery = tokio::time::timeout(timeout, deliver(handle.as_mut(), notification));
            tokio::pin!(delivery);
            loop {
                tokio::select! {
                    biased;
                    outcome = &mut delivery => {
                        match outcome {
                            Ok(Ok(())) => {}
                            Ok(Err(err)) => warn!(player = %name, error = %format!("{err:#}"), "notification failed"),
                            Err(_) => warn!(player = %name, ?timeout, "notification timed out"),
                        }
                        break None;
                    }
                    command = commands.recv(), if !closed => match command {
                        Some(Command::Notify(next)) => backlog.push_back(next),
                        Some(request) => break Some(request),
                        None => closed = true,
                    },
                }
            }
        };

        if let Some(request) = interrupted {
            warn!(player = %name, dropped = backlog.len() + 1, "request arrived, pending notifications dropped");
            backlog.clear();
            answer(handle.as_mut(), request).await;
        }
    }
}

async fn answer(handle: &mut dyn PlayerHandle, request: Command) {
    // The referee may have stopped listening, so a failed send is fine
    match request {
        Command::Placement(state, reply) => {
            let _ = reply.send(handle.request_placement(state).await);
        }
        Command::Move(state, reply) => {
            let _ = reply.send(handle.request_move(state).await);
        }
        Command::Notify(_) => {}
    }
}
