use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Time to build a response in seconds. Tagged with route, status.",
};

pub const REDIRECT_RESOLVED: MetricDef = MetricDef {
    name: "redirect.resolved",
    metric_type: MetricType::Counter,
    description: "Cloak links sent to a configured destination. Tagged with campaign.",
};

pub const REDIRECT_FALLBACK: MetricDef = MetricDef {
    name: "redirect.fallback",
    metric_type: MetricType::Counter,
    description: "Cloak links sent to the site root instead. Tagged with reason.",
};

pub const PAGE_SERVED: MetricDef = MetricDef {
    name: "page.served",
    metric_type: MetricType::Counter,
    description: "Locale pages served. Tagged with campaign, page.",
};

pub const PAGE_NOT_FOUND: MetricDef = MetricDef {
    name: "page.not_found",
    metric_type: MetricType::Counter,
    description: "Locale page requests answered with 404. Tagged with reason.",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_DURATION,
    REDIRECT_RESOLVED,
    REDIRECT_FALLBACK,
    PAGE_SERVED,
    PAGE_NOT_FOUND,
];
