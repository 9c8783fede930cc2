//! Starter projects offered by `init` and the editor.

use std::fmt;
use std::str::FromStr;

use crate::error::StackwiseError;
use crate::model::{Connection, ConnectionType, CostModel, Layer, LayerId, UsePath};
use crate::state::project::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Blank,
    Sample,
    Microservices,
    ThreeTier,
    Serverless,
}

impl Template {
    pub const ALL: [Template; 5] = [
        Template::Blank,
        Template::Sample,
        Template::Microservices,
        Template::ThreeTier,
        Template::Serverless,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Template::Blank => "blank",
            Template::Sample => "sample",
            Template::Microservices => "microservices",
            Template::ThreeTier => "three-tier",
            Template::Serverless => "serverless",
        }
    }

    /// A fresh project with this template's content.
    pub fn build(self) -> Project {
        match self {
            Template::Blank => Project::new("New Project", vec![Layer::new("1", "New Layer")]),
            Template::Sample => sample(),
            Template::Microservices => microservices(),
            Template::ThreeTier => three_tier(),
            Template::Serverless => serverless(),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = StackwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| StackwiseError::UnknownTemplate {
                name: s.to_string(),
            })
    }
}

fn layer(id: u64, name: &str, layer_type: &str, technology: &str, description: &str) -> Layer {
    let mut layer = Layer::new(id, name).with_type(layer_type);
    layer.technology = technology.to_string();
    layer.description = description.to_string();
    layer
}

fn costs(fixed: f64, variable: f64, unit: &str, notes: &str) -> CostModel {
    let mut model = CostModel::monthly(fixed);
    if variable > 0.0 {
        model = model.with_variable(variable, unit);
    }
    model.notes = notes.to_string();
    model
}

fn link(mut layer: Layer, target: u64, connection_type: ConnectionType) -> Layer {
    layer.connections.push(Connection::new(target, connection_type));
    layer
}

fn sample() -> Project {
    let mut components = Layer::new("1_1", "Components").with_type("Frontend");
    components.technology = "React".to_string();
    let mut state = Layer::new("1_2", "State Management").with_type("Frontend");
    state.technology = "Redux Toolkit".to_string();

    let ui = layer(1, "React UI", "Frontend", "React 18, TypeScript", "User interface layer")
        .with_cost(costs(50.0, 0.0, "", "CDN + hosting"))
        .with_substack(components.with_cost(CostModel::monthly(0.0)))
        .with_substack(state.with_cost(CostModel::monthly(0.0)));

    let layers = vec![
        link(ui, 2, ConnectionType::Http),
        link(
            layer(2, "REST API", "API", "Express.js", "API gateway")
                .with_cost(costs(400.0, 0.00002, "per 1M requests", "Compute + bandwidth")),
            3,
            ConnectionType::Http,
        ),
        link(
            layer(3, "Business Logic", "Backend", "Node.js", "Core business logic")
                .with_cost(costs(300.0, 0.0, "", "Compute resources")),
            4,
            ConnectionType::Database,
        ),
        layer(4, "PostgreSQL", "Database", "PostgreSQL 15", "Primary database").with_cost(costs(
            250.0,
            0.0001,
            "per GB stored",
            "Instance + storage + I/O",
        )),
    ];

    let mut project = Project::new("Sample Project", layers);
    let ids: Vec<LayerId> = (1..=4u64).map(LayerId::from).collect();
    project.use_paths = vec![
        UsePath::new("load-dashboard", "Load Dashboard", ids.clone())
            .with_calls(&ids[1], 3.0)
            .with_calls(&ids[3], 5.0),
        UsePath::new("health-check", "Health Check", vec![ids[1].clone()]),
    ];
    project
}

fn microservices() -> Project {
    let gateway = layer(1, "API Gateway", "API", "Kong/NGINX", "Entry point for all requests")
        .with_cost(costs(500.0, 0.00001, "per 1M requests", "Gateway infrastructure"));
    let gateway = [2, 3, 4]
        .into_iter()
        .fold(gateway, |l, t| link(l, t, ConnectionType::Http));

    let services = [
        (2, "User Service", "Node.js", "User management", 200.0, 5),
        (3, "Order Service", "Java Spring", "Order processing", 250.0, 6),
        (4, "Payment Service", "Python", "Payment processing", 300.0, 7),
    ]
    .into_iter()
    .map(|(id, name, tech, desc, fixed, db)| {
        link(
            layer(id, name, "Backend", tech, desc)
                .with_cost(costs(fixed, 0.0, "", "Microservice compute")),
            db,
            ConnectionType::Database,
        )
    });

    let databases = [
        (5, "User DB", "PostgreSQL", "User data", 150.0, 0.0001, "per GB"),
        (6, "Order DB", "MongoDB", "Order data", 200.0, 0.00005, "per 1M ops"),
        (7, "Payment DB", "PostgreSQL", "Payment data", 150.0, 0.0001, "per GB"),
    ]
    .into_iter()
    .map(|(id, name, tech, desc, fixed, variable, unit)| {
        layer(id, name, "Database", tech, desc)
            .with_cost(costs(fixed, variable, unit, "Database instance"))
    });

    let layers = std::iter::once(gateway)
        .chain(services)
        .chain(databases)
        .collect();
    Project::new("Microservices Architecture", layers)
}

fn three_tier() -> Project {
    let layers = vec![
        link(
            layer(1, "Web Frontend", "Frontend", "React", "User interface")
                .with_cost(costs(75.0, 0.0, "", "CDN + hosting")),
            2,
            ConnectionType::Http,
        ),
        link(
            layer(2, "Application Server", "Backend", "Java Spring Boot", "Business logic")
                .with_cost(costs(350.0, 0.0, "", "Application server")),
            3,
            ConnectionType::Database,
        ),
        layer(3, "Database", "Database", "MySQL", "Data storage")
            .with_cost(costs(200.0, 0.00008, "per GB", "Database instance")),
    ];
    Project::new("Three-Tier Architecture", layers)
}

fn serverless() -> Project {
    let cdn = link(
        layer(1, "CloudFront CDN", "Frontend", "AWS CloudFront", "Content delivery")
            .with_cost(costs(0.0, 0.085, "per GB", "Pay-per-use CDN")),
        2,
        ConnectionType::Http,
    );
    let api = [3, 4, 5].into_iter().fold(
        layer(2, "API Gateway", "API", "AWS API Gateway", "API management")
            .with_cost(costs(0.0, 0.0000035, "per request", "Serverless API")),
        |l, t| link(l, t, ConnectionType::Http),
    );
    let lambdas = [
        (3, "Auth Lambda", "Authentication", 6),
        (4, "Data Lambda", "Data processing", 6),
        (5, "File Lambda", "File handling", 7),
    ]
    .into_iter()
    .map(|(id, name, desc, store)| {
        link(
            layer(id, name, "Backend", "AWS Lambda", desc)
                .with_cost(costs(0.0, 0.0000002, "per GB-second", "Serverless compute")),
            store,
            ConnectionType::Database,
        )
    });
    let stores = [
        layer(6, "DynamoDB", "Database", "AWS DynamoDB", "NoSQL database")
            .with_cost(costs(0.0, 0.00000125, "per read unit", "On-demand pricing")),
        layer(7, "S3 Storage", "Database", "AWS S3", "Object storage")
            .with_cost(costs(0.0, 0.023, "per GB", "Object storage")),
    ];

    let layers = [cdn, api]
        .into_iter()
        .chain(lambdas)
        .chain(stores)
        .collect();
    Project::new("Serverless Architecture", layers)
}
