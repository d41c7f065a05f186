use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Customer events
    CustomerCreated(i64),
    CustomerUpdated(i64),
    CustomerDeleted(i64),

    // Order events
    OrderCreated(i64),
    OrderCodeAssigned {
        order_id: i64,
        code: String,
    },
    OrderUpdated(i64),
    OrderDeleted(i64),
    OrderStatusChanged {
        order_id: i64,
        old_status: String,
        new_status: String,
    },

    // Measurement events
    MeasurementAdded {
        order_id: i64,
        measurement_id: i64,
    },
    MeasurementUpdated(i64),
    MeasurementDeleted(i64),

    // Work order events
    WorkOrderCreated {
        order_id: i64,
        detail_id: i64,
    },
    WorkOrderUpdated(i64),
    WorkOrderImageAttached {
        detail_id: i64,
        url: String,
    },
    SaleOrderConverted {
        source_order_id: i64,
        work_order_id: i64,
    },

    // Stage events
    StageStatusChanged {
        stage_id: i64,
        old_status: String,
        new_status: String,
    },

    // Scheduling events
    AssignmentCreated(i64),
    AssignmentUpdated(i64),
    AssignmentDeleted(i64),

    // Draft events
    DraftSaved(String),
    DraftCleared(String),

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Define a trait for handling events. Handlers implementing this trait will process events asynchronously.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: Event) -> Result<(), String>;
}

// Function to process incoming events and distribute them to registered event handlers.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        info!("Received event: {:?}", event);

        match event {
            Event::OrderCreated(order_id) => {
                if let Err(e) = handle_order_created(order_id).await {
                    error!(
                        "Failed to handle order created event: order_id={}, error={}",
                        order_id, e
                    );
                }
            }
            Event::SaleOrderConverted {
                source_order_id,
                work_order_id,
            } => {
                if let Err(e) = handle_sale_converted(source_order_id, work_order_id).await {
                    error!(
                        "Failed to handle sale conversion event: source_order_id={}, error={}",
                        source_order_id, e
                    );
                }
            }
            Event::StageStatusChanged {
                stage_id,
                old_status,
                new_status,
            } => {
                if let Err(e) =
                    handle_stage_status_changed(stage_id, &old_status, &new_status).await
                {
                    error!(
                        "Failed to handle stage status change: stage_id={}, error={}",
                        stage_id, e
                    );
                }
            }
            Event::AssignmentCreated(assignment_id) => {
                info!("Assignment created: {}", assignment_id);
            }
            Event::AssignmentUpdated(assignment_id) => {
                info!("Assignment updated: {}", assignment_id);
            }
            Event::AssignmentDeleted(assignment_id) => {
                info!("Assignment deleted: {}", assignment_id);
            }
            // Add more event handlers as needed
            _ => {
                info!("No specific handler for event: {:?}", event);
            }
        }
    }

    warn!("Event processing loop has ended");
}

// Handler functions for specific events
async fn handle_order_created(order_id: i64) -> Result<(), String> {
    // When an order is created the shop floor may need to print a job sheet
    // or notify the measurement crew
    info!("Processing order created event for order {}", order_id);

    Ok(())
}

async fn handle_sale_converted(source_order_id: i64, work_order_id: i64) -> Result<(), String> {
    info!(
        "Sale order {} converted into work order {}",
        source_order_id, work_order_id
    );

    Ok(())
}

async fn handle_stage_status_changed(
    stage_id: i64,
    old_status: &str,
    new_status: &str,
) -> Result<(), String> {
    info!(
        "Stage {} moved from {} to {}",
        stage_id, old_status, new_status
    );

    match new_status {
        "delayed" => {
            warn!(
                "Stage {} is delayed - production schedule may need rebalancing",
                stage_id
            );
        }
        "on_hold" => {
            warn!("Stage {} placed on hold", stage_id);
        }
        _ => {}
    }

    Ok(())
}
