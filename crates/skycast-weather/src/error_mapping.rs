use crate::types::WeatherError;
use skycast_core::{AppError, NetworkError, ReqwestErrorExt, WeatherError as CoreWeatherError};

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::EmptyQuery => AppError::Weather(CoreWeatherError::EmptyQuery),
            WeatherError::LocationNotFound(q) => {
                AppError::Weather(CoreWeatherError::LocationNotFound(q))
            }
            WeatherError::Network(e) => AppError::Network(e.into_network_error()),
            WeatherError::Api { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            WeatherError::Parse(s) => AppError::Weather(CoreWeatherError::ApiError(s)),
            WeatherError::Favorites(s) => AppError::Weather(CoreWeatherError::FavoritesError(s)),
            WeatherError::Io(e) => AppError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_not_found_maps_to_weather() {
        let app: AppError = WeatherError::LocationNotFound("Atlantis".into()).into();
        assert!(matches!(
            app,
            AppError::Weather(CoreWeatherError::LocationNotFound(ref q)) if q == "Atlantis"
        ));
    }

    #[test]
    fn test_api_status_maps_to_server_error() {
        let app: AppError = WeatherError::Api {
            status: 503,
            message: "busy".into(),
        }
        .into();
        assert!(matches!(
            app,
            AppError::Network(NetworkError::ServerError { status: 503, .. })
        ));
        assert_eq!(
            app.user_message(),
            "The server is experiencing issues. Please try again later."
        );
    }

    #[test]
    fn test_favorites_maps_to_weather() {
        let app: AppError = WeatherError::Favorites("bad json".into()).into();
        assert!(matches!(app, AppError::Weather(CoreWeatherError::FavoritesError(_))));
    }
}
