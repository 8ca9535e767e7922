/// Decimal precision for ratio calculations (percentages, progress)
pub const DECIMAL_PRECISION: u32 = 6;

/// Local cache key holding the snapshot list
pub const NETWORTH_DATA_KEY: &str = "networthData";

/// Local cache key holding the net worth goal
pub const NETWORTH_GOAL_KEY: &str = "networthGoal";

/// Settings key used by document stores for the goal
pub const GOAL_SETTING_KEY: &str = "networth_goal";
