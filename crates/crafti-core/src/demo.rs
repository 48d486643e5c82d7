//! Canned demo data: the stock button artifact, the stock reply and the
//! seeded sessions shown on first launch.

use crate::types::{GeneratedArtifact, Message, Session, SessionId, SessionRecord};
use chrono::{Duration, Utc};

pub const DEMO_REPLY: &str = "I've created a modern button component based on your request! \
The component includes multiple variants (primary, secondary, outline) and different sizes. \
You can see the live preview on the right, and the code is available in the JSX/TSX and CSS tabs.";

const DEMO_MARKUP: &str = r#"import React from 'react';
import './button.css';

interface ButtonProps {
  children: React.ReactNode;
  variant?: 'primary' | 'secondary' | 'outline';
  size?: 'small' | 'medium' | 'large';
  onClick?: () => void;
}

export const ModernButton: React.FC<ButtonProps> = ({
  children,
  variant = 'primary',
  size = 'medium',
  onClick
}) => {
  return (
    <button
      className={`modern-button ${variant} ${size}`}
      onClick={onClick}
    >
      {children}
    </button>
  );
};"#;

const DEMO_STYLESHEET: &str = r#".modern-button {
  border: none;
  border-radius: 8px;
  font-weight: 600;
  cursor: pointer;
  transition: all 0.2s ease;
  display: inline-flex;
  align-items: center;
  justify-content: center;
}

.modern-button.primary {
  background: linear-gradient(135deg, #3b82f6, #1d4ed8);
  color: white;
}

.modern-button.secondary {
  background: #f3f4f6;
  color: #374151;
}

.modern-button.outline {
  background: transparent;
  border: 2px solid #3b82f6;
  color: #3b82f6;
}

.modern-button.small { padding: 8px 16px; font-size: 14px; }
.modern-button.medium { padding: 12px 24px; font-size: 16px; }
.modern-button.large { padding: 16px 32px; font-size: 18px; }

.modern-button:hover {
  transform: translateY(-2px);
  box-shadow: 0 4px 12px rgba(59, 130, 246, 0.3);
}"#;

const DEMO_PREVIEW: &str = r#"<div style="padding: 40px; background: linear-gradient(135deg, #f8fafc, #e2e8f0); min-height: 200px; display: flex; flex-direction: column; gap: 20px; align-items: center; justify-content: center;">
  <button style="background: linear-gradient(135deg, #3b82f6, #1d4ed8); color: white; border: none; border-radius: 8px; padding: 12px 24px; font-size: 16px; font-weight: 600;">Primary Button</button>
  <button style="background: #f3f4f6; color: #374151; border: none; border-radius: 8px; padding: 12px 24px; font-size: 16px; font-weight: 600;">Secondary Button</button>
  <button style="background: transparent; border: 2px solid #3b82f6; color: #3b82f6; border-radius: 8px; padding: 12px 24px; font-size: 16px; font-weight: 600;">Outline Button</button>
</div>"#;

pub fn demo_artifact() -> GeneratedArtifact {
    GeneratedArtifact::new(DEMO_MARKUP, DEMO_STYLESHEET, DEMO_PREVIEW)
}

/// Sessions present on first launch. The button session carries canned history.
pub fn seed_records() -> Vec<SessionRecord> {
    let now = Utc::now();

    let button_time = now - Duration::hours(2);
    let mut prompt = Message::user("Create a modern button component with multiple variants", None);
    prompt.timestamp = button_time;
    let mut reply = Message::assistant(
        "I've created a modern button component with primary, secondary, and outline variants!",
    );
    reply.timestamp = button_time + Duration::seconds(30);

    let button = SessionRecord {
        session: Session {
            id: SessionId::new("demo-button"),
            name: "Modern Button Component".to_string(),
            description: "A sleek, customizable button with hover effects and multiple variants"
                .to_string(),
            last_modified: button_time,
            message_count: 2,
            has_component: true,
        },
        transcript: vec![prompt, reply],
        artifact: Some(demo_artifact()),
    };

    let profile = SessionRecord {
        session: Session {
            id: SessionId::new("demo-profile-card"),
            name: "User Profile Card".to_string(),
            description: "Clean profile card with avatar, name, and social links".to_string(),
            last_modified: now - Duration::days(1),
            message_count: 0,
            has_component: false,
        },
        transcript: Vec::new(),
        artifact: None,
    };

    vec![button, profile]
}
