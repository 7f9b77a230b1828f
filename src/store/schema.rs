pub const SCHEMA: &str = r#"

CREATE TABLE IF NOT EXISTS child (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    street TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT,
    lat DOUBLE PRECISION,
    lon DOUBLE PRECISION,
    category TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS driver (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    capabilities TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS vehicle (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    capacity INTEGER NOT NULL,
    equipment TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS route (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    date DATE NOT NULL,
    status TEXT NOT NULL,
    driver_id UUID REFERENCES driver(id),
    vehicle_id UUID REFERENCES vehicle(id)
);

CREATE TABLE IF NOT EXISTS stop (
    id UUID PRIMARY KEY,
    sequence INTEGER NOT NULL,
    kind TEXT NOT NULL,
    status TEXT NOT NULL,
    child_id UUID NOT NULL REFERENCES child(id),
    route_id UUID NOT NULL REFERENCES route(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS route_date_idx ON route(date);
CREATE INDEX IF NOT EXISTS stop_route_idx ON stop(route_id);

"#;
