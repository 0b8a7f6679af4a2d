//! Built-in contract templates.

/// A ready-to-use contract document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractTemplate {
    /// Identifier used to look the template up
    pub name: &'static str,
    /// One-line summary
    pub description: &'static str,
    /// Business domain declared by the template
    pub domain: &'static str,
    /// YAML contract text
    pub content: &'static str,
}

const BASIC_USER_EVENTS: &str = r#"contract_version: "1.0"
domain: user-analytics
description: Basic user events contract
schema:
  user_id:
    type: string
    required: true
    pattern: '^usr_\d+$'
    description: Unique user identifier
  email:
    type: string
    format: email
    required: true
    description: User email address
  age:
    type: integer
    required: false
    min: 13
    max: 120
    description: User age
  timestamp:
    type: timestamp
    required: true
    description: Event timestamp
quality_rules:
  freshness:
    max_latency_hours: 1
  completeness:
    min_row_count: 100
    max_null_percentage: 5
"#;

const ECOMMERCE_ORDERS: &str = r#"contract_version: "1.0"
domain: e-commerce
description: E-commerce order events
schema:
  order_id:
    type: string
    pattern: '^ord_[a-zA-Z0-9]+$'
    required: true
    description: Unique order identifier
  customer_id:
    type: string
    required: true
    description: Customer identifier
  total_amount:
    type: float
    min: 0
    required: true
    description: Total order amount
  items:
    type: array
    required: true
    description: Order line items
    items:
      type: object
      properties:
        product_id:
          type: string
          required: true
        quantity:
          type: integer
          min: 1
          required: true
        price:
          type: float
          min: 0
          required: true
  order_date:
    type: timestamp
    required: true
quality_rules:
  freshness:
    max_latency_hours: 24
  completeness:
    min_row_count: 1
  uniqueness:
    fields: [order_id]
"#;

const IOT_SENSOR_DATA: &str = r#"contract_version: "1.0"
domain: iot
description: IoT sensor readings
schema:
  device_id:
    type: string
    required: true
    description: Device identifier
  sensor_type:
    type: string
    enum: [temperature, humidity, pressure]
    required: true
    description: Type of sensor
  value:
    type: float
    required: true
    description: Sensor reading value
  unit:
    type: string
    required: true
    description: Unit of measurement
  timestamp:
    type: timestamp
    required: true
quality_rules:
  freshness:
    max_latency_hours: 1
  completeness:
    min_row_count: 10
  statistics:
    value:
      mean: { min: -50, max: 150 }
"#;

static TEMPLATES: [ContractTemplate; 3] = [
    ContractTemplate {
        name: "basic-user-events",
        description: "Basic user analytics events with user ID and email",
        domain: "user-analytics",
        content: BASIC_USER_EVENTS,
    },
    ContractTemplate {
        name: "ecommerce-orders",
        description: "E-commerce order events with line items",
        domain: "e-commerce",
        content: ECOMMERCE_ORDERS,
    },
    ContractTemplate {
        name: "iot-sensor-data",
        description: "IoT sensor readings with device tracking",
        domain: "iot",
        content: IOT_SENSOR_DATA,
    },
];

/// Returns every built-in template.
pub fn templates() -> &'static [ContractTemplate] {
    &TEMPLATES
}

/// Looks a template up by name.
pub fn template(name: &str) -> Option<&'static ContractTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}
