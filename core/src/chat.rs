use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::context::AuxiliaryContext;
use crate::contract::{Contract, FieldPath, ObjectReader, Violation};
use crate::enums::{ChatInputType, LifestyleType};
use crate::error::InvalidRequest;
use crate::operation::{Operation, response_format};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitialChatContext {
    pub app_goal: String,
    pub lifestyle_type: LifestyleType,
}

/// Request for POST /ai/chat/sessions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionRequest {
    pub session_id: i64,
    pub user_id: i64,
    pub initial_context: InitialChatContext,
}

/// A quick-reply choice offered with a bot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BotMessageOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BotMessage {
    pub message_id: i64,
    pub text: String,
    pub options: Vec<BotMessageOption>,
}

/// Response for POST /ai/chat/sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionResponse {
    pub bot_message: BotMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatInput {
    #[serde(rename = "type")]
    pub input_type: ChatInputType,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl ChatInput {
    /// The user's input as presented to the agent; empty when the matching field is absent.
    pub fn describe(&self) -> String {
        match (self.input_type, &self.text, &self.value) {
            (ChatInputType::Text, Some(text), _) if !text.is_empty() => {
                format!("사용자 텍스트 입력: {text}")
            }
            (ChatInputType::Option, _, Some(value)) if !value.is_empty() => {
                format!("사용자 선택지 입력: {value}")
            }
            _ => String::new(),
        }
    }
}

/// Request for POST /ai/chat/messages
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub session_id: i64,
    pub user_id: i64,
    pub input: ChatInput,
    #[schema(value_type = String, example = "2026-01-10T21:15:00+09:00")]
    pub timestamp: DateTime<FixedOffset>,
}

impl ChatMessageRequest {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        let (field, present) = match self.input.input_type {
            ChatInputType::Text => ("input.text", &self.input.text),
            ChatInputType::Option => ("input.value", &self.input.value),
        };
        if present.as_deref().is_none_or(|s| s.trim().is_empty()) {
            return Err(InvalidRequest {
                field: field.to_string(),
                message: format!(
                    "{field} is required when input.type is {}",
                    self.input.input_type
                ),
                received: present.clone().map(Value::String),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    pub is_terminal: bool,
}

/// Response for POST /ai/chat/messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub bot_message: BotMessage,
    pub state: ChatState,
}

impl Contract for BotMessageOption {
    const NAME: &'static str = "BotMessageOption";

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
        let obj = ObjectReader::new(value, path)?;
        Ok(BotMessageOption {
            label: obj.string("label")?,
            value: obj.string("value")?,
        })
    }
}

impl Contract for BotMessage {
    const NAME: &'static str = "BotMessage";

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
        let obj = ObjectReader::new(value, path)?;
        Ok(BotMessage {
            message_id: obj.integer("messageId")?,
            text: obj.string("text")?,
            options: obj.list("options")?,
        })
    }
}

impl Contract for ChatSessionResponse {
    const NAME: &'static str = "ChatSessionResponse";

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
        let obj = ObjectReader::new(value, path)?;
        Ok(ChatSessionResponse {
            bot_message: obj.nested("botMessage")?,
        })
    }
}

impl Contract for ChatState {
    const NAME: &'static str = "ChatState";

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
        let obj = ObjectReader::new(value, path)?;
        Ok(ChatState {
            is_terminal: obj.boolean("isTerminal")?,
        })
    }
}

impl Contract for ChatMessageResponse {
    const NAME: &'static str = "ChatMessageResponse";

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
        let obj = ObjectReader::new(value, path)?;
        Ok(ChatMessageResponse {
            bot_message: obj.nested("botMessage")?,
            state: obj.nested("state")?,
        })
    }
}

const CHAT_SESSION_EXAMPLE: &str = r#"{
    "botMessage": {
        "messageId": 5001,
        "text": "안녕하세요! 요즘 운동이나 생활 습관에서 가장 고민되는 부분이 무엇인가요?",
        "options": [
            {"label": "운동이 너무 힘들어요", "value": "EXERCISE_HARD"},
            {"label": "식단 관리가 어려워요", "value": "DIET_HARD"}
        ]
    }
}"#;

const CHAT_MESSAGE_EXAMPLE: &str = r#"{
    "botMessage": {
        "messageId": 5002,
        "text": "사용자의 입력에 대한 챗봇 응답 메시지",
        "options": [
            {"label": "선택지 1", "value": "VALUE_1"},
            {"label": "선택지 2", "value": "VALUE_2"}
        ]
    },
    "state": {
        "isTerminal": false
    }
}"#;

/// Greeting that opens a coaching chat session.
pub struct ChatSessionOpen;

impl Operation for ChatSessionOpen {
    const NAME: &'static str = "chat_session_open";
    type Request = ChatSessionRequest;
    type Response = ChatSessionResponse;

    fn caller_id(request: &ChatSessionRequest) -> String {
        request.user_id.to_string()
    }

    fn instruction(request: &ChatSessionRequest) -> String {
        format!(
            "새로운 채팅 세션이 시작되었습니다.\n\
             사용자 ID: {user_id}\n\
             세션 ID: {session_id}\n\
             사용자 초기 컨텍스트:\n\
             - 앱 사용 목적: {goal}\n\
             - 생활 패턴: {lifestyle}\n\
             \n\
             이 정보를 바탕으로 사용자에게 친근하게 인사하고, \
             어떤 점이 가장 고민되는지 물어보는 초기 챗봇 메시지를 생성해주세요.\n\
             메시지에는 2~3개의 선택지 옵션을 포함하여 사용자가 쉽게 대화를 시작할 수 있도록 유도해주세요.\n\
             {contract}",
            user_id = request.user_id,
            session_id = request.session_id,
            goal = request.initial_context.app_goal,
            lifestyle = request.initial_context.lifestyle_type,
            contract = response_format(CHAT_SESSION_EXAMPLE),
        )
    }

    fn context(request: &ChatSessionRequest) -> AuxiliaryContext {
        AuxiliaryContext::new()
            .preference("appGoal", request.initial_context.app_goal.as_str())
            .preference("lifestyleType", request.initial_context.lifestyle_type.as_str())
    }
}

/// One user turn in an open chat session.
pub struct ChatTurn;

impl Operation for ChatTurn {
    const NAME: &'static str = "chat_turn";
    type Request = ChatMessageRequest;
    type Response = ChatMessageResponse;

    fn caller_id(request: &ChatMessageRequest) -> String {
        request.user_id.to_string()
    }

    fn instruction(request: &ChatMessageRequest) -> String {
        format!(
            "이전 대화 세션 ID: {session_id}\n\
             사용자 ID: {user_id}\n\
             사용자 입력: {input}\n\
             입력 시각: {timestamp}\n\
             \n\
             사용자의 입력에 대해 챗봇 메시지를 생성해주세요.\n\
             필요하다면 2~3개의 선택지 옵션을 제공해주세요.\n\
             대화가 종료되어야 할 시점에는 \"state.isTerminal\"을 true로 설정해주세요.\n\
             {contract}",
            session_id = request.session_id,
            user_id = request.user_id,
            input = request.input.describe(),
            timestamp = request.timestamp.to_rfc3339(),
            contract = response_format(CHAT_MESSAGE_EXAMPLE),
        )
    }

    fn context(request: &ChatMessageRequest) -> AuxiliaryContext {
        AuxiliaryContext::new()
            .event("session_id", request.session_id)
            .event("input_type", request.input.input_type.as_str())
            .event("input_content", request.input.describe())
            .event("timestamp", request.timestamp.to_rfc3339())
    }
}
