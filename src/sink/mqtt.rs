#![cfg(feature = "sink-mqtt")]

use std::collections::HashMap;
use std::net::IpAddr;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rumqttc::{Client, LastWill, MqttOptions, QoS};

use crate::occupancy::SpotState;
use crate::sink::StatusSink;
use crate::StatusUpdate;

const DEFAULT_BROKER_PORT: u16 = 1883;

/// Configuration for the MQTT status sink.
#[derive(Clone, Debug)]
pub struct MqttSinkConfig {
    /// Broker address, `host[:port]`.
    pub broker_addr: String,
    /// Topic prefix; spot statuses land on `<prefix>/spot/<id>/state`.
    pub topic_prefix: String,
    pub client_id: String,
    /// Allow non-loopback brokers. Off by default: status tuples stay
    /// on the machine unless the deployment opts in.
    pub allow_remote: bool,
}

impl Default for MqttSinkConfig {
    fn default() -> Self {
        Self {
            broker_addr: "127.0.0.1:1883".to_string(),
            topic_prefix: "parkwatch".to_string(),
            client_id: "parkwatchd".to_string(),
            allow_remote: false,
        }
    }
}

/// Sink that publishes spot statuses to an MQTT broker.
///
/// Transitions are published retained with QoS 1, so late subscribers
/// see the current lot state immediately. Availability is tracked via
/// `<prefix>/status` with a Last Will: `online` retained at connect,
/// `offline` when the daemon drops off.
pub struct MqttSink {
    client: Client,
    topic_prefix: String,
    last: HashMap<u32, SpotState>,
}

impl MqttSink {
    pub fn connect(config: MqttSinkConfig) -> Result<Self> {
        let (host, port) = split_broker_addr(&config.broker_addr)?;
        if !config.allow_remote && !is_loopback_host(&host) {
            return Err(anyhow!(
                "MQTT broker {} is not loopback; enable allow_remote to opt in",
                config.broker_addr
            ));
        }

        let availability_topic = format!("{}/{}", config.topic_prefix, "status");
        let mut options = MqttOptions::new(config.client_id.clone(), host, port);
        options.set_keep_alive(Duration::from_secs(30));
        options.set_last_will(LastWill::new(
            availability_topic.clone(),
            "offline",
            QoS::AtLeastOnce,
            true,
        ));

        let (client, mut connection) = Client::new(options, 64);

        // The client only makes progress while its connection is
        // polled; drain it on a background thread for the daemon's
        // lifetime. rumqttc reconnects between iterations.
        thread::Builder::new()
            .name("mqtt-sink".to_string())
            .spawn(move || {
                for event in connection.iter() {
                    if let Err(e) = event {
                        log::warn!("mqtt connection error: {}", e);
                        thread::sleep(Duration::from_secs(1));
                    }
                }
            })
            .context("failed to spawn MQTT connection thread")?;

        client
            .publish(availability_topic, QoS::AtLeastOnce, true, "online")
            .context("failed to publish MQTT availability")?;

        Ok(Self {
            client,
            topic_prefix: config.topic_prefix,
            last: HashMap::new(),
        })
    }
}

impl StatusSink for MqttSink {
    fn name(&self) -> &'static str {
        "mqtt"
    }

    fn publish(&mut self, updates: &[StatusUpdate]) -> Result<()> {
        for update in updates {
            if self.last.get(&update.zone_id) == Some(&update.status) {
                continue;
            }
            let topic = format!("{}/spot/{}/state", self.topic_prefix, update.zone_id);
            let payload = serde_json::to_vec(update).context("failed to encode status update")?;
            self.client
                .publish(topic, QoS::AtLeastOnce, true, payload)
                .with_context(|| format!("failed to publish status for spot {}", update.zone_id))?;
            self.last.insert(update.zone_id, update.status);
        }
        Ok(())
    }
}

fn split_broker_addr(addr: &str) -> Result<(String, u16)> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Err(anyhow!("MQTT broker address is empty"));
    }
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .map_err(|_| anyhow!("invalid MQTT broker port in '{}'", addr))?;
            Ok((host.to_string(), port))
        }
        None => Ok((addr.to_string(), DEFAULT_BROKER_PORT)),
    }
}

fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
