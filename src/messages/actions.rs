//! Actions - everything a consumer can ask of the store

use crate::models::{
    ApplicationDraft, ApplicationStatus, ApplyAiConfig, FlashJobDraft, JobDraft, JobSearch,
    LoginPayload, NotificationKind, OutgoingMessage, PasswordReset, PaymentIntentRequest,
    PaymentRequest, ProfileUpdate, RegisterPayload,
};
use crate::store::{Lane, SliceId};

/// Operations dispatched to the store.
///
/// Remote actions go through begin / success / failure; local ones mutate
/// their slice directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Auth
    Login(LoginPayload),
    Register(RegisterPayload),
    Logout,
    FetchProfile,
    UpdateProfile(ProfileUpdate),
    RefreshToken,
    ForgotPassword { email: String },
    VerifyOtp { email: String, otp: String },
    ResetPassword(PasswordReset),

    // Payments
    ProcessPayment(PaymentRequest),
    FetchPaymentHistory,
    FetchPaymentDetails(String),
    CreatePaymentIntent(PaymentIntentRequest),

    // Subscriptions
    FetchSubscriptions,
    Subscribe { package_id: String },
    CancelSubscription(u64),

    // Statistics
    FetchDashboard,
    FetchJobStats(u64),

    // Jobs
    FetchJobs,
    FetchJob(u64),
    FetchEmployerJobs,
    SearchJobs(JobSearch),
    PublishJob(JobDraft),
    UpdateJob { id: u64, draft: JobDraft },
    DeleteJob(u64),
    ToggleFavorite(u64),
    FetchFavorites,

    // Flash jobs
    FetchFlashJobs { page: u32, per_page: u32 },
    SearchFlashJobs { location: Option<String>, date: Option<String> },
    FetchFlashJob(u64),
    PublishFlashJob(FlashJobDraft),
    UpdateFlashJob { id: u64, draft: FlashJobDraft },
    DeleteFlashJob(u64),
    ApplyFlashJob(u64),

    // Applications
    FetchApplications,
    CreateApplication(ApplicationDraft),
    UpdateApplicationStatus { id: u64, status: ApplicationStatus },
    WithdrawApplication(u64),

    // Messages
    FetchConversations,
    FetchMessages(u64),
    SendMessage(OutgoingMessage),

    // Apply AI
    FetchAiSuggestions,
    AutoApply(u64),
    FetchAutoApplyHistory,
    FetchApplyAiConfig,
    UpdateApplyAiConfig(ApplyAiConfig),
    SetAutoApply(bool),

    // UI flags (local)
    ToggleNightMode,
    SetNightMode(bool),
    SetSearchBarVisible(bool),
    ShowNotification { message: String, kind: NotificationKind },
    HideNotification,
    SetGlobalLoading(bool),

    /// Drop the error shown on a slice
    ClearError(SliceId),

    /// Stop the store and network actors
    Shutdown,
}

impl Action {
    /// Slice this action writes to
    pub fn slice(&self) -> SliceId {
        match self {
            Action::Login(_)
            | Action::Register(_)
            | Action::Logout
            | Action::FetchProfile
            | Action::UpdateProfile(_)
            | Action::RefreshToken
            | Action::ForgotPassword { .. }
            | Action::VerifyOtp { .. }
            | Action::ResetPassword(_) => SliceId::Auth,

            Action::ProcessPayment(_)
            | Action::FetchPaymentHistory
            | Action::FetchPaymentDetails(_)
            | Action::CreatePaymentIntent(_) => SliceId::Payment,

            Action::FetchSubscriptions | Action::Subscribe { .. } | Action::CancelSubscription(_) => {
                SliceId::Subscription
            }

            Action::FetchDashboard | Action::FetchJobStats(_) => SliceId::Statistics,

            Action::FetchJobs
            | Action::FetchJob(_)
            | Action::FetchEmployerJobs
            | Action::SearchJobs(_)
            | Action::PublishJob(_)
            | Action::UpdateJob { .. }
            | Action::DeleteJob(_)
            | Action::ToggleFavorite(_)
            | Action::FetchFavorites => SliceId::Jobs,

            Action::FetchFlashJobs { .. }
            | Action::SearchFlashJobs { .. }
            | Action::FetchFlashJob(_)
            | Action::PublishFlashJob(_)
            | Action::UpdateFlashJob { .. }
            | Action::DeleteFlashJob(_)
            | Action::ApplyFlashJob(_) => SliceId::FlashJobs,

            Action::FetchApplications
            | Action::CreateApplication(_)
            | Action::UpdateApplicationStatus { .. }
            | Action::WithdrawApplication(_) => SliceId::Applications,

            Action::FetchConversations | Action::FetchMessages(_) | Action::SendMessage(_) => {
                SliceId::Messages
            }

            Action::FetchAiSuggestions
            | Action::AutoApply(_)
            | Action::FetchAutoApplyHistory
            | Action::FetchApplyAiConfig
            | Action::UpdateApplyAiConfig(_)
            | Action::SetAutoApply(_) => SliceId::ApplyAi,

            Action::ToggleNightMode
            | Action::SetNightMode(_)
            | Action::SetSearchBarVisible(_)
            | Action::ShowNotification { .. }
            | Action::HideNotification
            | Action::SetGlobalLoading(_)
            | Action::Shutdown => SliceId::Ui,

            Action::ClearError(slice) => *slice,
        }
    }

    /// Fetches are superseded by a later dispatch of the same fetch; everything
    /// else is a write whose answer always lands
    pub fn lane(&self) -> Lane {
        match self {
            // both replace the same listing
            Action::FetchFlashJobs { .. } | Action::SearchFlashJobs { .. } => {
                Lane::Read("flash_job_listing")
            }
            Action::FetchProfile
            | Action::FetchPaymentHistory
            | Action::FetchPaymentDetails(_)
            | Action::FetchSubscriptions
            | Action::FetchDashboard
            | Action::FetchJobStats(_)
            | Action::FetchJobs
            | Action::FetchJob(_)
            | Action::FetchEmployerJobs
            | Action::SearchJobs(_)
            | Action::FetchFavorites
            | Action::FetchFlashJob(_)
            | Action::FetchApplications
            | Action::FetchConversations
            | Action::FetchMessages(_)
            | Action::FetchAiSuggestions
            | Action::FetchAutoApplyHistory
            | Action::FetchApplyAiConfig => Lane::Read(self.name()),
            _ => Lane::Write,
        }
    }

    /// Whether the request needs the session's bearer token
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Action::Login(_)
                | Action::Register(_)
                | Action::Logout
                | Action::RefreshToken
                | Action::ForgotPassword { .. }
                | Action::VerifyOtp { .. }
                | Action::ResetPassword(_)
        )
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::Login(_) => "login",
            Action::Register(_) => "register",
            Action::Logout => "logout",
            Action::FetchProfile => "fetch_profile",
            Action::UpdateProfile(_) => "update_profile",
            Action::RefreshToken => "refresh_token",
            Action::ForgotPassword { .. } => "forgot_password",
            Action::VerifyOtp { .. } => "verify_otp",
            Action::ResetPassword(_) => "reset_password",
            Action::ProcessPayment(_) => "process_payment",
            Action::FetchPaymentHistory => "fetch_payment_history",
            Action::FetchPaymentDetails(_) => "fetch_payment_details",
            Action::CreatePaymentIntent(_) => "create_payment_intent",
            Action::FetchSubscriptions => "fetch_subscriptions",
            Action::Subscribe { .. } => "subscribe",
            Action::CancelSubscription(_) => "cancel_subscription",
            Action::FetchDashboard => "fetch_dashboard",
            Action::FetchJobStats(_) => "fetch_job_stats",
            Action::FetchJobs => "fetch_jobs",
            Action::FetchJob(_) => "fetch_job",
            Action::FetchEmployerJobs => "fetch_employer_jobs",
            Action::SearchJobs(_) => "search_jobs",
            Action::PublishJob(_) => "publish_job",
            Action::UpdateJob { .. } => "update_job",
            Action::DeleteJob(_) => "delete_job",
            Action::ToggleFavorite(_) => "toggle_favorite",
            Action::FetchFavorites => "fetch_favorites",
            Action::FetchFlashJobs { .. } => "fetch_flash_jobs",
            Action::SearchFlashJobs { .. } => "search_flash_jobs",
            Action::FetchFlashJob(_) => "fetch_flash_job",
            Action::PublishFlashJob(_) => "publish_flash_job",
            Action::UpdateFlashJob { .. } => "update_flash_job",
            Action::DeleteFlashJob(_) => "delete_flash_job",
            Action::ApplyFlashJob(_) => "apply_flash_job",
            Action::FetchApplications => "fetch_applications",
            Action::CreateApplication(_) => "create_application",
            Action::UpdateApplicationStatus { .. } => "update_application_status",
            Action::WithdrawApplication(_) => "withdraw_application",
            Action::FetchConversations => "fetch_conversations",
            Action::FetchMessages(_) => "fetch_messages",
            Action::SendMessage(_) => "send_message",
            Action::FetchAiSuggestions => "fetch_ai_suggestions",
            Action::AutoApply(_) => "auto_apply",
            Action::FetchAutoApplyHistory => "fetch_auto_apply_history",
            Action::FetchApplyAiConfig => "fetch_apply_ai_config",
            Action::UpdateApplyAiConfig(_) => "update_apply_ai_config",
            Action::SetAutoApply(_) => "set_auto_apply",
            Action::ToggleNightMode => "toggle_night_mode",
            Action::SetNightMode(_) => "set_night_mode",
            Action::SetSearchBarVisible(_) => "set_search_bar_visible",
            Action::ShowNotification { .. } => "show_notification",
            Action::HideNotification => "hide_notification",
            Action::SetGlobalLoading(_) => "set_global_loading",
            Action::ClearError(_) => "clear_error",
            Action::Shutdown => "shutdown",
        }
    }

    /// Message shown when a failure carries nothing more specific
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Action::Login(_) => "Identifiants invalides",
            Action::Register(_) => "Erreur lors de l'inscription",
            Action::Logout => "Erreur lors de la déconnexion",
            Action::FetchProfile => "Erreur lors de la récupération du profil",
            Action::UpdateProfile(_) => "Erreur lors de la mise à jour du profil",
            Action::RefreshToken => "Erreur lors du rafraîchissement de la session",
            Action::ForgotPassword { .. } => "Erreur lors de l'envoi de l'email",
            Action::VerifyOtp { .. } => "Erreur lors de la vérification du OTP",
            Action::ResetPassword(_) => "Erreur lors de la réinitialisation du mot de passe",
            Action::ProcessPayment(_) => "Erreur lors du traitement du paiement",
            Action::FetchPaymentHistory => {
                "Erreur lors de la récupération de l'historique des paiements"
            }
            Action::FetchPaymentDetails(_) => "Erreur lors de la récupération du paiement",
            Action::CreatePaymentIntent(_) => "Erreur lors de l'initialisation du paiement",
            Action::FetchSubscriptions => "Erreur lors de la récupération des abonnements",
            Action::Subscribe { .. } => "Erreur lors de la souscription à l'abonnement",
            Action::CancelSubscription(_) => "Erreur lors de l'annulation de l'abonnement",
            Action::FetchDashboard => "Erreur lors de la récupération des statistiques",
            Action::FetchJobStats(_) => "Erreur lors de la récupération des statistiques du poste",
            Action::FetchJobs => "Impossible de charger les offres",
            Action::FetchJob(_) => "Impossible de charger les détails de l'offre",
            Action::FetchEmployerJobs => "Impossible de charger vos offres",
            Action::SearchJobs(_) => "Erreur lors de la recherche d'emplois",
            Action::PublishJob(_) => "Erreur lors de la publication de l'offre",
            Action::UpdateJob { .. } => "Erreur lors de la mise à jour de l'offre",
            Action::DeleteJob(_) => "Impossible de supprimer l'offre",
            Action::ToggleFavorite(_) => "Erreur lors de la gestion des favoris",
            Action::FetchFavorites => "Erreur lors de la récupération des favoris",
            Action::FetchFlashJobs { .. } | Action::SearchFlashJobs { .. } => {
                "Impossible de charger les emplois flash"
            }
            Action::FetchFlashJob(_) => "Impossible de charger l'emploi flash",
            Action::PublishFlashJob(_) => "Erreur lors de la publication de l'emploi flash",
            Action::UpdateFlashJob { .. } => "Erreur lors de la mise à jour de l'emploi flash",
            Action::DeleteFlashJob(_) => "Impossible de supprimer l'emploi flash",
            Action::ApplyFlashJob(_) => "Erreur lors de la candidature à l'emploi flash",
            Action::FetchApplications => "Erreur lors de la récupération des candidatures",
            Action::CreateApplication(_) => "Erreur lors de la création de la candidature",
            Action::UpdateApplicationStatus { .. } => {
                "Erreur lors de la mise à jour de la candidature"
            }
            Action::WithdrawApplication(_) => "Erreur lors du retrait de la candidature",
            Action::FetchConversations => "Erreur lors de la récupération des conversations",
            Action::FetchMessages(_) => "Erreur lors de la récupération des messages",
            Action::SendMessage(_) => "Erreur lors de l'envoi du message",
            Action::FetchAiSuggestions => "Erreur lors de la récupération des suggestions",
            Action::AutoApply(_) => "Erreur lors de la candidature automatique",
            Action::FetchAutoApplyHistory => "Erreur lors de la récupération de l'historique",
            Action::FetchApplyAiConfig => "Erreur lors de la récupération de la configuration",
            Action::UpdateApplyAiConfig(_) | Action::SetAutoApply(_) => {
                "Erreur lors de la mise à jour de la configuration"
            }
            _ => crate::constants::GENERIC_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_routing() {
        assert_eq!(Action::CancelSubscription(1).slice(), SliceId::Subscription);
        assert_eq!(Action::ToggleFavorite(1).slice(), SliceId::Jobs);
        assert_eq!(Action::ClearError(SliceId::Payment).slice(), SliceId::Payment);
    }

    #[test]
    fn test_auth_entry_points_are_anonymous() {
        assert!(!Action::RefreshToken.requires_auth());
        assert!(!Action::Logout.requires_auth());
        assert!(Action::FetchPaymentHistory.requires_auth());
    }

    #[test]
    fn test_lanes() {
        assert_eq!(Action::FetchPaymentHistory.lane(), Lane::Read("fetch_payment_history"));
        assert_eq!(Action::Logout.lane(), Lane::Write);
        assert_eq!(Action::CancelSubscription(1).lane(), Lane::Write);
        assert_eq!(
            Action::FetchFlashJobs { page: 1, per_page: 20 }.lane(),
            Action::SearchFlashJobs { location: None, date: None }.lane()
        );
        assert_eq!(Action::FetchFavorites.slice(), SliceId::Jobs);
        assert_eq!(Action::AutoApply(3).slice(), SliceId::ApplyAi);
    }
}
