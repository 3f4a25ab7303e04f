//! Charts module - SVG chart rendering

mod renderer;

pub use renderer::{
    recharge_color, recharge_tier, trend_color, ChartError, ChartRenderer,
    CHARGING_STATIONS_FILE, CHARGING_TITLE, PRICE_TRENDS_FILE, VEHICLE_COSTS_FILE,
};
