//! Integration tests for end-to-end fitting

// Single and multi-peak profile fits
mod profiles;

// Noisy data, masking and goodness of fit
mod noisy_data;

// Annotation labels and result reporting
mod annotations;
