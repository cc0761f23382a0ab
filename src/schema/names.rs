//! Table and field names of the XER tables the transformer reads or writes.

pub const PROJECT: &str = "PROJECT";
pub const PROJWBS: &str = "PROJWBS";
pub const TASK: &str = "TASK";
pub const TASKPRED: &str = "TASKPRED";
pub const TASKRSRC: &str = "TASKRSRC";
pub const RSRC: &str = "RSRC";
pub const ACTVTYPE: &str = "ACTVTYPE";
pub const ACTVCODE: &str = "ACTVCODE";
pub const TASKACTV: &str = "TASKACTV";
/// Synthesized by the transformer, never present in a raw export.
pub const WBS_HIERARCHY: &str = "WBS_HIERARCHY";

pub mod field {
    pub const PROJ_ID: &str = "proj_id";

    pub const WBS_ID: &str = "wbs_id";
    pub const WBS_NAME: &str = "wbs_name";
    pub const PARENT_WBS_ID: &str = "parent_wbs_id";

    pub const STABLE_WBS_ID: &str = "stable_wbs_id";
    pub const LEVEL: &str = "level";
    pub const PARENT_STABLE_WBS_ID: &str = "parent_stable_wbs_id";
    pub const WBS_STABLE_ID_REF: &str = "wbs_stable_id_ref";

    pub const TASK_ID: &str = "task_id";
    pub const TASK_CODE: &str = "task_code";
    pub const PRED_TASK_ID: &str = "pred_task_id";
    pub const TASK_ID_CODE: &str = "task_id_code";
    pub const PRED_TASK_ID_CODE: &str = "pred_task_id_code";

    pub const RSRC_ID: &str = "rsrc_id";
    pub const RSRC_NAME: &str = "rsrc_name";
    pub const RSRC_ID_NAME: &str = "rsrc_id_name";
    pub const PROJECT_ID: &str = "project_id";

    pub const ACTV_CODE_TYPE_ID: &str = "actv_code_type_id";
    pub const ACTV_CODE_TYPE: &str = "actv_code_type";
    pub const ACTV_CODE_TYPE_NAME: &str = "actv_code_type_name";
    pub const ACTV_CODE_ID: &str = "actv_code_id";
    pub const ACTV_CODE_NAME: &str = "actv_code_name";
    pub const ACTV_CODE_ID_NAME: &str = "actv_code_id_name";
}
