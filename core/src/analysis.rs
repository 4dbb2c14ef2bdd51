use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::context::AuxiliaryContext;
use crate::contract::{Contract, ContractEnum, FieldPath, ObjectReader, Violation};
use crate::enums::{Difficulty, Intent, MissionResult, MissionType};
use crate::error::InvalidRequest;
use crate::operation::{Operation, bullet_lines, response_format};

// --- Daily feedback ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayMission {
    pub mission_type: MissionType,
    pub difficulty: Difficulty,
    pub result: MissionResult,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentSummary {
    pub success_days: u32,
    pub failure_days: u32,
}

/// Request for POST /ai/analysis/daily
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyFeedbackRequest {
    pub user_id: i64,
    pub target_date: NaiveDate,
    pub today_mission: TodayMission,
    pub recent_summary: RecentSummary,
}

/// A candidate message for the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EncouragementCandidate {
    pub intent: Intent,
    pub title: String,
    pub message: String,
}

/// Response for POST /ai/analysis/daily
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyFeedbackResponse {
    pub feedback_text: String,
    pub encouragement_candidates: Vec<EncouragementCandidate>,
}

impl Contract for EncouragementCandidate {
    const NAME: &'static str = "EncouragementCandidate";

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
        let obj = ObjectReader::new(value, path)?;
        Ok(EncouragementCandidate {
            intent: obj.enumeration("intent")?,
            title: obj.string("title")?,
            message: obj.string("message")?,
        })
    }
}

impl Contract for DailyFeedbackResponse {
    const NAME: &'static str = "DailyFeedbackResponse";

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
        let obj = ObjectReader::new(value, path)?;
        Ok(DailyFeedbackResponse {
            feedback_text: obj.string("feedbackText")?,
            encouragement_candidates: obj.list("encouragementCandidates")?,
        })
    }
}

const DAILY_FEEDBACK_EXAMPLE: &str = r#"{
    "feedbackText": "오늘 미션 수행 결과 및 최근 기록을 반영한 분석형 AI 피드백 문장",
    "encouragementCandidates": [
        {
            "intent": "PRAISE",
            "title": "잘하고 있어요",
            "message": "이대로만 하면 목표에 도달할 수 있어요."
        },
        {
            "intent": "RETRY",
            "title": "다음은 다시 도전해봐요",
            "message": "내일은 5분짜리 미션부터 가볍게 시작해봐요."
        }
    ]
}"#;

/// Analytical feedback on today's mission plus encouragement candidates.
pub struct DailyFeedback;

impl Operation for DailyFeedback {
    const NAME: &'static str = "daily_feedback";
    type Request = DailyFeedbackRequest;
    type Response = DailyFeedbackResponse;

    fn caller_id(request: &DailyFeedbackRequest) -> String {
        request.user_id.to_string()
    }

    fn instruction(request: &DailyFeedbackRequest) -> String {
        let mission = &request.today_mission;
        let failure_note = mission
            .failure_reason
            .as_ref()
            .map(|reason| format!(" (실패 사유: {reason})"))
            .unwrap_or_default();

        format!(
            "사용자 ID: {user_id}\n\
             분석 대상 날짜: {date}\n\
             오늘 수행한 미션:\n\
             - 유형: {mission_type}\n\
             - 난이도: {difficulty}\n\
             - 결과: {result}{failure_note}\n\
             최근 요약:\n\
             - 성공 일수: {success_days}일\n\
             - 실패 일수: {failure_days}일\n\
             \n\
             위 정보를 바탕으로 다음 내용을 분석하여 피드백을 제공해주세요.\n\
             1. 오늘 미션 수행 결과 및 최근 기록을 반영한 분석형 AI 피드백 문장을 생성해주세요.\n\
             2. 메인 화면에 표시할 격려/응원 메시지 후보 2~4개를 생성해주세요. \
             각 메시지는 'intent'({intents} 중 하나), 'title', 'message'를 포함해야 합니다.\n\
             - PRAISE: 잘하고 있을 때 칭찬 및 목표 상기.\n\
             - RETRY: 실패가 반복되거나 재도전이 필요할 때 격려.\n\
             - NORMAL: 보통일 때 목표 달성을 격려.\n\
             - PUSH: 행동을 촉구할 때.\n\
             \n\
             {contract}",
            user_id = request.user_id,
            date = request.target_date,
            mission_type = mission.mission_type,
            difficulty = mission.difficulty,
            result = mission.result,
            success_days = request.recent_summary.success_days,
            failure_days = request.recent_summary.failure_days,
            intents = Intent::NAMES.join(", "),
            contract = response_format(DAILY_FEEDBACK_EXAMPLE),
        )
    }

    fn context(request: &DailyFeedbackRequest) -> AuxiliaryContext {
        let mission = &request.today_mission;
        AuxiliaryContext::new()
            .event("date", request.target_date.to_string())
            .event("missionType", mission.mission_type.as_str())
            .event("difficulty", mission.difficulty.as_str())
            .event("mission_result", mission.result.as_str())
            .event("fail_reason", mission.failure_reason.clone())
            .event("successDays_recent", request.recent_summary.success_days)
            .event("failureDays_recent", request.recent_summary.failure_days)
    }
}

// --- Weekly analysis ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub total_days: u32,
    pub success_days: u32,
    pub failure_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RankedFailureReason {
    pub reason: String,
    pub count: u32,
}

/// Request for POST /ai/analysis/weekly
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAnalysisRequest {
    pub user_id: i64,
    pub week_range: WeekRange,
    pub weekly_stats: WeeklyStats,
    pub failure_reasons_ranked: Vec<RankedFailureReason>,
}

impl WeeklyAnalysisRequest {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.week_range.start > self.week_range.end {
            return Err(InvalidRequest {
                field: "weekRange".to_string(),
                message: format!(
                    "weekRange.start ({}) must not be after weekRange.end ({})",
                    self.week_range.start, self.week_range.end
                ),
                received: serde_json::to_value(&self.week_range).ok(),
            });
        }
        Ok(())
    }
}

/// Response for POST /ai/analysis/weekly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAnalysisResponse {
    pub main_failure_reason: String,
    pub overall_feedback: String,
}

impl Contract for WeeklyAnalysisResponse {
    const NAME: &'static str = "WeeklyAnalysisResponse";

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
        let obj = ObjectReader::new(value, path)?;
        Ok(WeeklyAnalysisResponse {
            main_failure_reason: obj.string("mainFailureReason")?,
            overall_feedback: obj.string("overallFeedback")?,
        })
    }
}

const WEEKLY_ANALYSIS_EXAMPLE: &str = r#"{
    "mainFailureReason": "주간 주요 실패 원인 요약 (예: 운동 가능 시간 확보 실패)",
    "overallFeedback": "유지/개선 중심 종합 피드백 (예: 이번 주에는 일정 제약으로 미션 실패가 많았네요. 다음 주에는 시간을 조금 더 확보해보세요.)"
}"#;

/// Summary of the week's main failure cause and overall feedback.
pub struct WeeklyAnalysis;

impl Operation for WeeklyAnalysis {
    const NAME: &'static str = "weekly_analysis";
    type Request = WeeklyAnalysisRequest;
    type Response = WeeklyAnalysisResponse;

    fn caller_id(request: &WeeklyAnalysisRequest) -> String {
        request.user_id.to_string()
    }

    fn instruction(request: &WeeklyAnalysisRequest) -> String {
        let stats = &request.weekly_stats;
        let reasons = bullet_lines(
            request
                .failure_reasons_ranked
                .iter()
                .map(|item| format!("{}: {}회", item.reason, item.count)),
        );

        format!(
            "사용자 ID: {user_id}\n\
             주간 분석 범위: {start} ~ {end}\n\
             주간 통계:\n\
             - 총 일수: {total}일\n\
             - 성공 일수: {success}일\n\
             - 실패 일수: {failure}일\n\
             주요 실패 원인 (횟수 기준):\n\
             {reasons}\n\
             \n\
             위 주간 데이터를 종합적으로 분석하여 사용자에게 다음 두 가지 정보를 제공해주세요.\n\
             1. 주간 주요 실패 원인을 요약한 문장 (mainFailureReason).\n\
             2. 사용자 유지/개선 중심의 종합 피드백 문장 (overallFeedback).\n\
             \n\
             {contract}",
            user_id = request.user_id,
            start = request.week_range.start,
            end = request.week_range.end,
            total = stats.total_days,
            success = stats.success_days,
            failure = stats.failure_days,
            contract = response_format(WEEKLY_ANALYSIS_EXAMPLE),
        )
    }

    fn context(request: &WeeklyAnalysisRequest) -> AuxiliaryContext {
        let stats = &request.weekly_stats;
        let ranked = request
            .failure_reasons_ranked
            .iter()
            .map(|item| format!("{} ({}회)", item.reason, item.count))
            .collect::<Vec<_>>()
            .join(", ");

        AuxiliaryContext::new()
            .event("week_start", request.week_range.start.to_string())
            .event("week_end", request.week_range.end.to_string())
            .event("totalDays_weekly", stats.total_days)
            .event("successDays_weekly", stats.success_days)
            .event("failureDays_weekly", stats.failure_days)
            .event("failureReasons_ranked", ranked)
    }
}
