//! Actor runner: the main harness for running an actor as a process.
//!
//! The runner handles the bus connection, subscriptions, message dispatch,
//! the tick loop and teardown. Actors only implement [`Actor`].

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use sensor_net::{Bus, Command, InboundMessage, NatsConnection, topics};

use crate::config::ActorConfig;
use crate::context::TickContext;
use crate::lifecycle::{Lifecycle, StopReason};
use crate::signals;

/// Behaviour plugged into an [`ActorRunner`].
pub trait Actor: Send {
    /// Handle a message from one of the input subscriptions.
    ///
    /// Malformed payloads are the actor's to report and discard; nothing
    /// here stops the loop.
    fn on_message(&mut self, message: &InboundMessage);

    /// Handle a command other than `stop` from the command topic.
    fn on_command(&mut self, command: &str) {
        info!(command, "ignoring unknown command");
    }

    /// Run one tick, queueing anything to publish on `ctx`.
    ///
    /// # Errors
    ///
    /// An error ends the run: the runner logs it and tears down.
    fn on_tick(&mut self, ctx: &mut TickContext) -> Result<()>;
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// What stopped the loop.
    pub reason: StopReason,
    /// Number of ticks executed.
    pub ticks: u64,
}

impl RunOutcome {
    /// Returns `true` unless the loop ended on a fault.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.reason != StopReason::Fault
    }
}

/// Turns an [`Actor`] into a bus-connected process.
#[derive(Debug)]
pub struct ActorRunner {
    /// Actor configuration.
    config: ActorConfig,
    /// Unique instance identifier for this process.
    instance_id: String,
    /// Shared run/stop state.
    lifecycle: Lifecycle,
    /// Input patterns actually subscribed, in order.
    data_patterns: Vec<String>,
}

impl ActorRunner {
    /// Create a new actor runner.
    #[must_use]
    pub fn new(config: ActorConfig) -> Self {
        let mut data_patterns: Vec<String> = Vec::new();
        for pattern in &config.inputs {
            if *pattern != config.command_topic && !data_patterns.contains(pattern) {
                data_patterns.push(pattern.clone());
            }
        }
        Self {
            config,
            instance_id: Uuid::new_v4().to_string(),
            lifecycle: Lifecycle::new(),
            data_patterns,
        }
    }

    /// Returns the unique instance ID for this runner.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Returns the actor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ActorConfig {
        &self.config
    }

    /// Returns a handle to the lifecycle, e.g. to request a stop from
    /// another task.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    /// Run the actor as a process.
    ///
    /// 1. Connect to NATS.
    /// 2. Install the interrupt/terminate listener.
    /// 3. Hand over to [`ActorRunner::run_with`].
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// subscription is rejected. Nothing is retried.
    pub async fn run<A: Actor>(self, actor: A) -> Result<RunOutcome> {
        let client_name = self.config.client_name().to_string();
        info!(
            actor = self.config.name,
            instance_id = self.instance_id,
            client_name,
            "actor starting"
        );

        let connection = match self.config.nats_url.as_deref() {
            Some(url) => NatsConnection::connect_with(url, &client_name).await,
            None => NatsConnection::connect(&client_name).await,
        }
        .with_context(|| format!("actor {} could not connect to the bus", self.config.name))?;

        let listener = signals::spawn_signal_listener(self.lifecycle());
        let outcome = self.run_with(&connection, actor).await;
        listener.abort();
        outcome
    }

    /// Run the actor over an already connected bus.
    ///
    /// Subscribes to every distinct input pattern and the command topic, then loops
    /// until the lifecycle leaves running: inbound messages are dispatched
    /// as they arrive and the actor ticks every `tick_interval`. A tick error
    /// or panic is logged and ends the loop. Teardown (unsubscribe, then
    /// disconnect) runs exactly once on every exit path after subscribing.
    ///
    /// # Errors
    ///
    /// Returns an error if a subscription is rejected.
    pub async fn run_with<B, A>(self, bus: &B, mut actor: A) -> Result<RunOutcome>
    where
        B: Bus + ?Sized,
        A: Actor,
    {
        let (sink, mut inbound) = mpsc::channel(self.config.inbound_capacity);

        if let Err(e) = self.subscribe_all(bus, sink).await {
            self.lifecycle.request_stop(StopReason::Fault);
            self.teardown(bus).await;
            return Err(e);
        }

        let ticks = self.drive(bus, &mut actor, &mut inbound).await;

        // Only reachable after a stop request, so the reason is set.
        let reason = self.lifecycle.stop_reason().unwrap_or(StopReason::Fault);
        self.teardown(bus).await;

        Ok(RunOutcome { reason, ticks })
    }

    async fn subscribe_all<B: Bus + ?Sized>(
        &self,
        bus: &B,
        sink: mpsc::Sender<InboundMessage>,
    ) -> Result<()> {
        for pattern in &self.data_patterns {
            bus.subscribe(pattern, sink.clone())
                .await
                .with_context(|| format!("subscribing to {pattern}"))?;
            info!(topic = pattern, "subscribed to input");
        }
        bus.subscribe(&self.config.command_topic, sink)
            .await
            .with_context(|| format!("subscribing to {}", self.config.command_topic))?;
        info!(topic = self.config.command_topic, "subscribed to commands");
        Ok(())
    }

    async fn drive<B, A>(
        &self,
        bus: &B,
        actor: &mut A,
        inbound: &mut mpsc::Receiver<InboundMessage>,
    ) -> u64
    where
        B: Bus + ?Sized,
        A: Actor,
    {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick_id = 0u64;

        loop {
            tokio::select! {
                biased;

                () = self.lifecycle.stop_requested() => break,

                message = inbound.recv() => {
                    let Some(message) = message else {
                        warn!("inbound channel closed");
                        self.lifecycle.request_stop(StopReason::InboundClosed);
                        break;
                    };
                    if let Err(e) = self.dispatch(actor, message) {
                        error!(error = %e, "dispatch failed");
                        self.lifecycle.request_stop(StopReason::Fault);
                        break;
                    }
                }

                _ = ticker.tick() => {
                    tick_id += 1;
                    if let Err(e) = self.tick(bus, actor, tick_id).await {
                        error!(tick = tick_id, error = %e, "tick failed");
                        self.lifecycle.request_stop(StopReason::Fault);
                        break;
                    }
                }
            }
        }

        tick_id
    }

    /// Route a message: the command topic goes to the lifecycle (or the
    /// actor's command hook) and never reaches the data path, even if an
    /// input pattern also matches it.
    ///
    /// A publication matching several subscriptions arrives once per
    /// subscription. Only one copy is handled: the command subscription's
    /// for the command topic, otherwise the first input pattern's.
    fn dispatch<A: Actor>(&self, actor: &mut A, message: InboundMessage) -> Result<()> {
        if message.topic == self.config.command_topic {
            if message.subscription != self.config.command_topic {
                debug!(topic = message.topic, subscription = message.subscription, "dropped command copy");
                return Ok(());
            }
            match Command::parse(&message.payload) {
                Command::Stop => {
                    info!(topic = message.topic, "stop command received");
                    self.lifecycle.request_stop(StopReason::Command);
                }
                Command::Other(command) => {
                    info!(topic = message.topic, command, "command received");
                    guarded(|| actor.on_command(&command))?;
                }
            }
            return Ok(());
        }

        let owner = self
            .data_patterns
            .iter()
            .find(|pattern| topics::matches(pattern, &message.topic));
        if owner.is_some_and(|owner| *owner != message.subscription) {
            debug!(topic = message.topic, subscription = message.subscription, "dropped duplicate delivery");
            return Ok(());
        }

        guarded(|| actor.on_message(&message))
    }

    async fn tick<B, A>(&self, bus: &B, actor: &mut A, tick_id: u64) -> Result<()>
    where
        B: Bus + ?Sized,
        A: Actor,
    {
        let mut ctx = TickContext::new(tick_id, Instant::now(), Local::now());
        guarded(|| actor.on_tick(&mut ctx))??;

        for outbound in ctx.take_outbox() {
            let topic = outbound.topic;
            match bus.publish(&topic, outbound.payload).await {
                Ok(()) => debug!(tick = tick_id, topic, "published"),
                Err(e) => warn!(tick = tick_id, topic, error = %e, "publish failed"),
            }
        }
        Ok(())
    }

    async fn teardown<B: Bus + ?Sized>(&self, bus: &B) {
        if let Err(e) = bus.unsubscribe_all().await {
            warn!(error = %e, "unsubscribe failed during teardown");
        }
        if let Err(e) = bus.disconnect().await {
            warn!(error = %e, "disconnect failed during teardown");
        }
        self.lifecycle.mark_stopped();
        info!(
            actor = self.config.name,
            instance_id = self.instance_id,
            reason = ?self.lifecycle.stop_reason(),
            "actor stopped and disconnected"
        );
    }
}

/// Run `f`, turning a panic into an error.
fn guarded<T>(f: impl FnOnce() -> T) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| anyhow!("panicked: {}", panic_message(&*payload)))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
