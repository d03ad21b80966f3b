/// 访客类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorKind {
    Pedestrian,
    Vehicle,
}

impl VisitorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitorKind::Pedestrian => "pedestrian",
            VisitorKind::Vehicle => "vehicle",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pedestrian" => Some(VisitorKind::Pedestrian),
            "vehicle" => Some(VisitorKind::Vehicle),
            _ => None,
        }
    }
}

/// 访客在场状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorStatus {
    Inside,
    Exited,
}

impl VisitorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitorStatus::Inside => "inside",
            VisitorStatus::Exited => "exited",
        }
    }
}

/// 访客登记输入（门岗录入）。
#[derive(Debug, Clone)]
pub struct NewVisitor {
    pub name: String,
    pub document_id: String,
    pub kind: VisitorKind,
    pub vehicle_plate: Option<String>,
    pub destination_unit: String,
    pub resident_name: String,
    pub parking_spot_code: Option<String>,
}

/// 访客台账记录。
#[derive(Debug, Clone, PartialEq)]
pub struct VisitorRecord {
    pub id: String,
    pub name: String,
    pub document_id: String,
    pub kind: VisitorKind,
    pub vehicle_plate: Option<String>,
    pub destination_unit: String,
    pub resident_name: String,
    pub entry_time_ms: i64,
    pub exit_time_ms: Option<i64>,
    pub bound_spot_code: Option<String>,
    pub status: VisitorStatus,
}

impl VisitorRecord {
    pub fn is_inside(&self) -> bool {
        self.status == VisitorStatus::Inside
    }
}
