//! Template content for generated Dockerfiles.

/// Placeholder replaced with the definition file path, relative to the build context.
pub const SRC_PLACEHOLDER: &str = "{SRC}";

/// Placeholder replaced with the environment name.
pub const KERNEL_NAME_PLACEHOLDER: &str = "{KERNEL_NAME}";

/// Dockerfile template for a conda environment exposed as a Jupyter kernel.
///
/// Continued `RUN` instructions are kept on a single physical line, so the
/// rendered file is byte-for-byte what earlier releases produced.
pub const DOCKERFILE_TEMPLATE: &str = concat!(
  "\n",
  "FROM jupyter/minimal-notebook:7a0c7325e470\n",
  "\n",
  "USER root\n",
  "COPY {SRC} /tmp/environment.yaml\n",
  "\n",
  "RUN conda env create -f /tmp/environment.yaml\n",
  "\n",
  "RUN bash -c \"source activate {KERNEL_NAME}\"",
  "     && conda install ipykernel --freeze-installed",
  "     && python -m ipykernel install --name {KERNEL_NAME} --display {KERNEL_NAME}\n",
  "\n",
  "RUN conda clean -afy",
  "     && find /opt/conda/ -follow -type f -name '*.a' -delete",
  "     && find /opt/conda/ -follow -type f -name '*.pyc' -delete",
  "     && find /opt/conda/ -follow -type f -name '*.js.map' -delete \n",
  "RUN fix-permissions $CONDA_DIR\n",
);
