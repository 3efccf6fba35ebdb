//! Maps crate-level errors to `stratus_core::AppError` for consistent
//! user-facing messages.

use stratus_core::AppError;

pub fn weather_error(e: stratus_weather::types::WeatherError) -> AppError {
    use stratus_weather::types::WeatherError as E;
    match e {
        E::Network(err) => {
            use stratus_core::error::ReqwestErrorExt;
            AppError::Network(err.into_network_error())
        }
        E::Api { status, message } => {
            AppError::Weather(stratus_core::WeatherError::ApiError(format!(
                "{}: {}",
                status, message
            )))
        }
        E::MalformedPayload(msg) => {
            AppError::Weather(stratus_core::WeatherError::MalformedData(msg))
        }
        E::NoMatch(name) => {
            AppError::Weather(stratus_core::WeatherError::LocationNotFound(name))
        }
        E::InvalidCoordinate(_) => AppError::Weather(stratus_core::WeatherError::ApiError(
            e.to_string(),
        )),
    }
}

pub fn chat_error(e: stratus_chat::ChatError) -> AppError {
    use stratus_chat::ChatError as E;
    match e {
        E::MissingApiKey => AppError::Chat(stratus_core::ChatError::MissingApiKey),
        E::RateLimited(rejection) => AppError::Chat(stratus_core::ChatError::RateLimited {
            retry_after_secs: rejection.retry_after_secs,
        }),
        E::EmptyInput => AppError::Chat(stratus_core::ChatError::EmptyMessage),
        E::Network(err) => {
            use stratus_core::error::ReqwestErrorExt;
            AppError::Network(err.into_network_error())
        }
        E::Api { status, message } => AppError::Chat(stratus_core::ChatError::ApiError(format!(
            "{}: {}",
            status, message
        ))),
        E::EmptyCompletion => {
            AppError::Chat(stratus_core::ChatError::ApiError(e.to_string()))
        }
    }
}

pub fn store_error(e: stratus_store::StoreError) -> AppError {
    AppError::Store(stratus_core::StoreError::WriteFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_maps_to_location_not_found() {
        let mapped = weather_error(stratus_weather::types::WeatherError::NoMatch(
            "Nowhereville".into(),
        ));
        assert_eq!(
            mapped.user_message(),
            "Location not found. Check and try again."
        );
    }

    #[test]
    fn test_missing_key_maps_to_config_message() {
        let mapped = chat_error(stratus_chat::ChatError::MissingApiKey);
        assert_eq!(
            mapped.user_message(),
            "Assistant is not configured. Set an API key in settings."
        );
    }

    #[test]
    fn test_rate_limit_carries_retry_seconds() {
        let mapped = chat_error(stratus_chat::ChatError::RateLimited(
            stratus_chat::Rejection {
                reason: stratus_chat::RejectReason::Quota,
                retry_after_secs: 5,
            },
        ));
        assert!(mapped.to_string().contains("5s"));
    }
}
