// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entities mirrored from the LMS backend.
//!
//! Every type here is an immutable value snapshot. Field names follow the
//! backend's camelCase JSON; missing optional collections decode as empty.

mod assignment;
mod content;
mod course;
mod enrollment;
mod notification;
mod payment;
mod user;

pub use assignment::{Assignment, NewSubmission, Submission, SubmissionStatus};
pub use content::{
    ContentItem, PlaybackGrant, Quality, UploadComplete, UploadRequest, UploadTicket,
};
pub use course::{Course, CourseFilters, Lesson, LessonKind, Level, Module, NewCourse, Paginated};
pub use enrollment::{Enrollment, EnrollmentStatus, ProgressUpdate};
pub use notification::{DeviceRegistration, Notification, NotificationKind, Platform, UnreadCount};
pub use payment::{Payment, PaymentIntent, PaymentStatus};
pub use user::{AuthSession, Credentials, Role, User};
