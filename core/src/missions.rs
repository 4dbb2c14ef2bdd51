use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::context::AuxiliaryContext;
use crate::contract::{Contract, ContractEnum, FieldPath, ObjectReader, Violation};
use crate::enums::{Difficulty, LifestyleType, MissionResult, MissionType, WorkTimeType};
use crate::operation::{Operation, bullet_lines, response_format};

/// Profile collected during onboarding.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingProfile {
    pub app_goal: String,
    pub work_time_type: WorkTimeType,
    #[schema(value_type = String, example = "18:30:00")]
    pub available_start_time: NaiveTime,
    #[schema(value_type = String, example = "22:00:00")]
    pub available_end_time: NaiveTime,
    pub min_exercise_minutes: u32,
    pub preferred_exercises: Vec<String>,
    pub lifestyle_type: LifestyleType,
}

/// One mission the user attempted recently.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MissionHistoryItem {
    pub date: NaiveDate,
    pub mission_type: MissionType,
    pub difficulty: Difficulty,
    pub result: MissionResult,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// Request for POST /ai/missions/daily
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyMissionRequest {
    pub user_id: i64,
    pub onboarding: OnboardingProfile,
    pub recent_mission_history: Vec<MissionHistoryItem>,
    pub weekly_failure_reasons: Vec<String>,
}

/// A recommended mission for today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub name: String,
    #[serde(rename = "type")]
    pub mission_type: MissionType,
    pub difficulty: Difficulty,
    pub estimated_minutes: i64,
    pub estimated_calories: i64,
}

/// Response for POST /ai/missions/daily
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyMissionResponse {
    pub missions: Vec<Mission>,
}

impl Contract for Mission {
    const NAME: &'static str = "Mission";

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
        let obj = ObjectReader::new(value, path)?;
        Ok(Mission {
            name: obj.string("name")?,
            mission_type: obj.enumeration("type")?,
            difficulty: obj.enumeration("difficulty")?,
            estimated_minutes: obj.integer("estimatedMinutes")?,
            estimated_calories: obj.integer("estimatedCalories")?,
        })
    }
}

impl Contract for DailyMissionResponse {
    const NAME: &'static str = "DailyMissionResponse";

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
        let obj = ObjectReader::new(value, path)?;
        Ok(DailyMissionResponse {
            missions: obj.list("missions")?,
        })
    }
}

const MISSIONS_EXAMPLE: &str = r#"{
    "missions": [
        {
            "name": "저녁 스트레칭 20분",
            "type": "EXERCISE",
            "difficulty": "EASY",
            "estimatedMinutes": 20,
            "estimatedCalories": 80
        },
        {
            "name": "단백질 중심 식단 기록",
            "type": "DIET",
            "difficulty": "NORMAL",
            "estimatedMinutes": 10,
            "estimatedCalories": 0
        }
    ]
}"#;

/// Two to three missions for today, based on the onboarding profile and recent history.
pub struct DailyMissions;

impl Operation for DailyMissions {
    const NAME: &'static str = "daily_missions";
    type Request = DailyMissionRequest;
    type Response = DailyMissionResponse;

    fn caller_id(request: &DailyMissionRequest) -> String {
        request.user_id.to_string()
    }

    fn instruction(request: &DailyMissionRequest) -> String {
        let profile = &request.onboarding;
        let history = bullet_lines(request.recent_mission_history.iter().map(|item| {
            let mut line = format!(
                "날짜: {}, 유형: {}, 난이도: {}, 결과: {}",
                item.date, item.mission_type, item.difficulty, item.result
            );
            if let Some(reason) = &item.failure_reason {
                line.push_str(&format!(", 실패 사유: {reason}"));
            }
            line
        }));
        let failure_reasons = if request.weekly_failure_reasons.is_empty() {
            "없음".to_string()
        } else {
            request.weekly_failure_reasons.join(", ")
        };

        format!(
            "사용자 ID: {user_id}\n\
             사용자 목표: {goal}\n\
             근무 시간 유형: {work_time}\n\
             운동 가능 시간: {start} ~ {end} ({minutes}분 이상)\n\
             선호 운동: {exercises}\n\
             생활 패턴: {lifestyle}\n\
             \n\
             최근 미션 이력:\n\
             {history}\n\
             \n\
             주간 주요 실패 원인: {failure_reasons}\n\
             \n\
             위 정보를 바탕으로 사용자에게 오늘 수행할 데일리 추천 미션 2~3개를 추천해주세요.\n\
             미션은 {mission_types} 유형으로 구성될 수 있습니다.\n\
             난이도는 {difficulties} 중 하나여야 합니다.\n\
             각 미션에 대해 예상 소요 시간(분)과 예상 소모 칼로리(kcal)를 함께 알려주세요.\n\
             {contract}",
            user_id = request.user_id,
            goal = profile.app_goal,
            work_time = profile.work_time_type,
            start = profile.available_start_time,
            end = profile.available_end_time,
            minutes = profile.min_exercise_minutes,
            exercises = profile.preferred_exercises.join(", "),
            lifestyle = profile.lifestyle_type,
            mission_types = MissionType::NAMES.join(" 또는 "),
            difficulties = Difficulty::NAMES.join(", "),
            contract = response_format(MISSIONS_EXAMPLE),
        )
    }

    fn context(request: &DailyMissionRequest) -> AuxiliaryContext {
        let profile = &request.onboarding;
        let history = &request.recent_mission_history;
        let successes = history
            .iter()
            .filter(|item| item.result == MissionResult::Success)
            .count();

        let mut context = AuxiliaryContext::new()
            .preference("appGoal", profile.app_goal.as_str())
            .preference("workTimeType", profile.work_time_type.as_str())
            .preference(
                "availableTime",
                format!(
                    "{}-{}",
                    profile.available_start_time, profile.available_end_time
                ),
            )
            .preference("minExerciseMinutes", profile.min_exercise_minutes)
            .preference("preferredExercises", profile.preferred_exercises.join(", "))
            .preference("lifestyleType", profile.lifestyle_type.as_str())
            .event(
                "weeklyFailureReasons",
                request.weekly_failure_reasons.join(", "),
            )
            .event("recentMissionCount", history.len())
            .event("recentSuccessCount", successes)
            .event("recentFailureCount", history.len() - successes);

        // Latest date wins; max_by_key keeps the later entry on ties.
        if let Some(latest) = history.iter().max_by_key(|item| item.date) {
            context = context
                .event("date", latest.date.to_string())
                .event("missionType", latest.mission_type.as_str())
                .event("difficulty", latest.difficulty.as_str())
                .event("mission_result", latest.result.as_str())
                .event("fail_reason", latest.failure_reason.clone());
        }
        context
    }
}
